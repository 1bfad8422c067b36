/// A migration rule as seen by the engine: an identifier and the condition
/// text from its `when.condition` field.
///
/// Rule files are loaded elsewhere; the engine only needs these two fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub id: String,
    pub condition: String,
}

impl Rule {
    pub fn new(id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
        }
    }
}
