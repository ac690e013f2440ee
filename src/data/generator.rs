use std::fmt;

use chrono::{Duration, Local, Months, NaiveDate};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::model::{Field, FieldKind, FieldValue, RecordSet, Schema};
use super::names;
use crate::error::{EdaError, Result};

pub const CATEGORIES: &[&str] = &["A", "B", "C"];
pub const GENDERS: &[&str] = &["Female", "Male", "Other"];
pub const PURCHASED: &[&str] = &["Yes", "No"];

/// Trailing window for `registration_date`, in calendar months.
const REGISTRATION_WINDOW_MONTHS: u32 = 24;

// ---------------------------------------------------------------------------
// Profiles – the fixed record layouts
// ---------------------------------------------------------------------------

/// Which record layout to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// name, city, age, income
    Demographics,
    /// id, name, age, city, registration_date, sales, category, satisfaction
    #[default]
    Sales,
    /// id, name, age, gender, income, purchased
    Customer,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::Demographics, Profile::Sales, Profile::Customer];

    fn columns(self) -> &'static [Column] {
        match self {
            Profile::Demographics => DEMOGRAPHICS,
            Profile::Sales => SALES,
            Profile::Customer => CUSTOMER,
        }
    }

    /// Schema of the records this profile produces.
    pub fn schema(self) -> Schema {
        let fields = self
            .columns()
            .iter()
            .map(|c| Field::new(c.name, c.kind))
            .collect();
        // Column names are unique per profile table.
        Schema::new(fields).unwrap_or_else(|_| unreachable!("profile columns are unique"))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Profile::Demographics => "demographics",
            Profile::Sales => "sales",
            Profile::Customer => "customer",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Profile {
    type Err = EdaError;

    fn from_str(s: &str) -> Result<Self> {
        Profile::ALL
            .into_iter()
            .find(|p| p.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| EdaError::invalid(format!("unknown profile '{s}'")))
    }
}

/// How a single column is drawn.
enum Draw {
    /// 1-based row number.
    Sequence,
    PersonName,
    CityName,
    /// Uniform integer, both ends inclusive.
    IntRange(i64, i64),
    /// Uniform continuous draw rounded to cents, both ends inclusive.
    Money(f64, f64),
    Choice(&'static [&'static str]),
    /// Uniform date in the trailing window ending today.
    RecentDate,
}

struct Column {
    name: &'static str,
    kind: FieldKind,
    draw: Draw,
}

const fn col(name: &'static str, kind: FieldKind, draw: Draw) -> Column {
    Column { name, kind, draw }
}

const DEMOGRAPHICS: &[Column] = &[
    col("name", FieldKind::Text, Draw::PersonName),
    col("city", FieldKind::Text, Draw::CityName),
    col("age", FieldKind::Integer, Draw::IntRange(18, 70)),
    col("income", FieldKind::Integer, Draw::IntRange(1000, 5000)),
];

const SALES: &[Column] = &[
    col("id", FieldKind::Integer, Draw::Sequence),
    col("name", FieldKind::Text, Draw::PersonName),
    col("age", FieldKind::Integer, Draw::IntRange(18, 70)),
    col("city", FieldKind::Text, Draw::CityName),
    col("registration_date", FieldKind::Date, Draw::RecentDate),
    col("sales", FieldKind::Float, Draw::Money(100.0, 5000.0)),
    col("category", FieldKind::Categorical, Draw::Choice(CATEGORIES)),
    col("satisfaction", FieldKind::Integer, Draw::IntRange(1, 5)),
];

const CUSTOMER: &[Column] = &[
    col("id", FieldKind::Integer, Draw::Sequence),
    col("name", FieldKind::Text, Draw::PersonName),
    col("age", FieldKind::Integer, Draw::IntRange(18, 70)),
    col("gender", FieldKind::Categorical, Draw::Choice(GENDERS)),
    col("income", FieldKind::Integer, Draw::IntRange(1000, 5000)),
    col("purchased", FieldKind::Categorical, Draw::Choice(PURCHASED)),
];

// ---------------------------------------------------------------------------
// RecordGenerator
// ---------------------------------------------------------------------------

/// Produces synthetic record sets for one [`Profile`].
///
/// Generation is a pure function of `(profile, count, seed, today)`: the RNG
/// lives only for the duration of one call.
#[derive(Debug, Clone, Default)]
pub struct RecordGenerator {
    profile: Profile,
    /// Anchor for date windows; `None` means the local date at call time.
    today: Option<NaiveDate>,
}

impl RecordGenerator {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            today: None,
        }
    }

    /// Pin the date that date windows end on.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Generate `count` records. With a seed the output is reproducible;
    /// without one every call draws from fresh OS entropy.
    pub fn generate(&self, count: usize, seed: Option<u64>) -> Result<RecordSet> {
        if count == 0 {
            return Err(EdaError::invalid("record count must be positive"));
        }
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let window_start = today
            .checked_sub_months(Months::new(REGISTRATION_WINDOW_MONTHS))
            .unwrap_or(today - Duration::days(730));
        let window_days = (today - window_start).num_days();

        let columns = self.profile.columns();
        let rows: Vec<Vec<FieldValue>> = (0..count)
            .map(|row| {
                columns
                    .iter()
                    .map(|c| draw_value(&c.draw, row, window_start, window_days, &mut rng))
                    .collect()
            })
            .collect();

        log::debug!(
            "generated {count} {} records (seed {seed:?}, anchored at {today})",
            self.profile
        );
        RecordSet::new(self.profile.schema(), rows)
    }
}

fn draw_value(
    draw: &Draw,
    row: usize,
    window_start: NaiveDate,
    window_days: i64,
    rng: &mut ChaCha8Rng,
) -> FieldValue {
    match draw {
        Draw::Sequence => FieldValue::Integer(row as i64 + 1),
        Draw::PersonName => FieldValue::Text(names::person_name(rng)),
        Draw::CityName => FieldValue::Text(names::city_name(rng)),
        Draw::IntRange(lo, hi) => FieldValue::Integer(rng.random_range(*lo..=*hi)),
        Draw::Money(lo, hi) => {
            let raw: f64 = rng.random_range(*lo..=*hi);
            FieldValue::Float((raw * 100.0).round() / 100.0)
        }
        Draw::Choice(options) => {
            let picked = options.choose(rng).copied().unwrap_or_default();
            FieldValue::Text(picked.to_string())
        }
        Draw::RecentDate => {
            let offset = rng.random_range(0..=window_days);
            FieldValue::Date(window_start + Duration::days(offset))
        }
    }
}

/// Generate `count` records of the default profile.
pub fn generate(count: usize, seed: Option<u64>) -> Result<RecordSet> {
    RecordGenerator::default().generate(count, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn ints(rs: &RecordSet, field: &str) -> Vec<i64> {
        rs.column(field)
            .unwrap()
            .map(|v| match v {
                FieldValue::Integer(i) => *i,
                other => panic!("expected integer, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn zero_count_is_invalid() {
        let err = generate(0, Some(1)).unwrap_err();
        assert!(matches!(err, EdaError::InvalidArgument(_)));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let generator = RecordGenerator::new(Profile::Sales).with_today(today());
        let a = generator.generate(200, Some(42)).unwrap();
        let b = generator.generate(200, Some(42)).unwrap();
        assert_eq!(a, b);

        let c = generator.generate(200, Some(43)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn unseeded_generation_draws_independent_samples() {
        let generator = RecordGenerator::new(Profile::Sales).with_today(today());
        let a = generator.generate(100, None).unwrap();
        let b = generator.generate(100, None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sales_fields_respect_their_bounds() {
        let rs = RecordGenerator::new(Profile::Sales)
            .with_today(today())
            .generate(500, Some(9))
            .unwrap();
        assert_eq!(rs.len(), 500);
        assert_eq!(ints(&rs, "id"), (1..=500).collect::<Vec<_>>());
        assert!(ints(&rs, "age").iter().all(|a| (18..=70).contains(a)));
        assert!(ints(&rs, "satisfaction").iter().all(|s| (1..=5).contains(s)));

        for value in rs.column("sales").unwrap() {
            let v = value.as_f64().unwrap();
            assert!((100.0..=5000.0).contains(&v), "{v}");
            assert_eq!((v * 100.0).round() / 100.0, v);
        }
        for value in rs.column("category").unwrap() {
            assert!(CATEGORIES.contains(&value.as_str().unwrap()));
        }
        let earliest = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        for value in rs.column("registration_date").unwrap() {
            let d = value.as_date().unwrap();
            assert!(d >= earliest && d <= today(), "{d}");
        }
    }

    #[test]
    fn demographics_and_customer_layouts() {
        let demo = RecordGenerator::new(Profile::Demographics)
            .generate(50, Some(3))
            .unwrap();
        let names: Vec<_> = demo.schema().names().collect();
        assert_eq!(names, ["name", "city", "age", "income"]);
        assert!(ints(&demo, "income").iter().all(|i| (1000..=5000).contains(i)));

        let customer = RecordGenerator::new(Profile::Customer)
            .generate(50, Some(3))
            .unwrap();
        for value in customer.column("gender").unwrap() {
            assert!(GENDERS.contains(&value.as_str().unwrap()));
        }
        for value in customer.column("purchased").unwrap() {
            assert!(PURCHASED.contains(&value.as_str().unwrap()));
        }
    }

    #[test]
    fn profile_parses_case_insensitively() {
        assert_eq!("Sales".parse::<Profile>().unwrap(), Profile::Sales);
        assert_eq!("customer".parse::<Profile>().unwrap(), Profile::Customer);
        assert!("bogus".parse::<Profile>().is_err());
    }
}
