use serde::Deserialize;
use serde_json::Value;

pub const EXPECTED_FIXTURE_VERSION: u64 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureCase {
    pub name: String,
    pub scenario: String,
    pub a: Value,
    #[serde(default)]
    pub b: Option<Value>,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub expected: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureFile {
    pub fixture_version: u64,
    pub cases: Vec<FixtureCase>,
}

pub fn load_fixtures() -> FixtureFile {
    let raw = include_str!("../fixtures/algebra.json");
    let file: FixtureFile = serde_json::from_str(raw).expect("fixture file must parse");
    assert_eq!(
        file.fixture_version, EXPECTED_FIXTURE_VERSION,
        "unexpected fixture version"
    );
    file
}
