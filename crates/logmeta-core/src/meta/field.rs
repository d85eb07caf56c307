use crate::error::InternalError;

///
/// FieldShape
///
/// The record shapes stored inside metadata hashes. Each shape is a textual
/// `<prefix>:<id>` field; the database shape also names the scope of every
/// table-scoped record.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldShape {
    Database,
    Table,
    AutoIncrementId,
    AutoTableId,
    Sequence,
    AutoRandomTableId,
}

impl FieldShape {
    /// Table-scoped shapes in dispatch priority order.
    pub const TABLE_SCOPED: [Self; 5] = [
        Self::Table,
        Self::AutoIncrementId,
        Self::AutoTableId,
        Self::Sequence,
        Self::AutoRandomTableId,
    ];

    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Database => "DB",
            Self::Table => "Table",
            Self::AutoIncrementId => "IID",
            Self::AutoTableId => "TID",
            Self::Sequence => "SID",
            Self::AutoRandomTableId => "TARID",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Table => "table",
            Self::AutoIncrementId => "auto_increment_id",
            Self::AutoTableId => "auto_table_id",
            Self::Sequence => "sequence",
            Self::AutoRandomTableId => "auto_random_table_id",
        }
    }

    /// Return true if `field` has this shape's `<prefix>:` lead.
    #[must_use]
    pub fn matches(self, field: &[u8]) -> bool {
        field
            .strip_prefix(self.prefix().as_bytes())
            .is_some_and(|rest| rest.first() == Some(&b':'))
    }

    /// Find the table-scoped shape of `field`, if any.
    #[must_use]
    pub fn table_scoped(field: &[u8]) -> Option<Self> {
        Self::TABLE_SCOPED.into_iter().find(|shape| shape.matches(field))
    }

    /// Encode `<prefix>:<id>`.
    #[must_use]
    pub fn encode(self, id: i64) -> Vec<u8> {
        format!("{}:{id}", self.prefix()).into_bytes()
    }

    /// Parse the id out of a `<prefix>:<id>` field.
    pub fn parse(self, field: &[u8]) -> Result<i64, InternalError> {
        let invalid = || {
            InternalError::meta_key_corruption(format!(
                "invalid {} field '{}'",
                self.as_str(),
                String::from_utf8_lossy(field)
            ))
        };

        if !self.matches(field) {
            return Err(invalid());
        }

        let digits = &field[self.prefix().len() + 1..];
        std::str::from_utf8(digits)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or_else(invalid)
    }
}
