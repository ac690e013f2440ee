use rand::seq::IndexedRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Carlos", "Lucía", "Mateo", "Sofía", "Diego", "Valentina", "Javier", "Camila",
    "Andrés", "Isabel", "Tomás", "Elena", "Pablo", "Martina", "Miguel", "Laura", "Daniel",
    "Paula", "Alejandro", "Emma", "James", "Olivia", "Liam", "Grace", "Noah", "Hannah",
    "Ethan", "Chloe", "Samuel",
];

const LAST_NAMES: &[&str] = &[
    "García", "Rodríguez", "Martínez", "López", "González", "Pérez", "Sánchez", "Ramírez",
    "Torres", "Flores", "Rivera", "Gómez", "Díaz", "Morales", "Ortiz", "Castillo", "Smith",
    "Johnson", "Brown", "Miller", "Wilson", "Moore", "Taylor", "Anderson", "Clark",
];

const CITY_PREFIXES: &[&str] = &[
    "North", "South", "East", "West", "New", "Port", "Lake", "Fort", "San", "Santa",
];

const CITY_ROOTS: &[&str] = &[
    "Maria", "Rosa", "Haven", "Brook", "Ridge", "Vale", "Marcos", "Clara", "Field", "Water",
    "Stone", "Oak", "Pine", "Mill", "Bridge",
];

const CITY_SUFFIXES: &[&str] = &["", "ton", "ville", "burgh", "port", "side", " Springs"];

/// Random "First Last" person name.
pub(crate) fn person_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
    format!("{first} {last}")
}

/// Random place name such as "Port Oakville" or "Santa Clara".
pub(crate) fn city_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let root = CITY_ROOTS.choose(rng).copied().unwrap_or("Haven");
    let suffix = CITY_SUFFIXES.choose(rng).copied().unwrap_or("");
    if rng.random_bool(0.5) {
        let prefix = CITY_PREFIXES.choose(rng).copied().unwrap_or("New");
        format!("{prefix} {root}{suffix}")
    } else {
        format!("{root}{suffix}")
    }
}
