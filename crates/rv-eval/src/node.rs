//! Identity of one requested output vector.

use std::fmt;

/// Where a request came from in the input deck; used only for warning
/// messages about unsupported keywords.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    pub filename: String,
    pub lineno: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, line {}", self.filename, self.lineno)
    }
}

/// One entry of the requested-output list, before classification.
#[derive(Clone, Debug)]
pub struct SummaryRequest {
    pub keyword: String,
    /// Well or group name for entity-scoped vectors.
    pub wgname: Option<String>,
    /// Region number, global cell index, connection/segment ordinal or
    /// aquifer id, depending on the keyword family.
    pub number: Option<i64>,
    pub location: Location,
}

impl SummaryRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            wgname: None,
            number: None,
            location: Location {
                filename: String::new(),
                lineno: 0,
            },
        }
    }

    pub fn for_entity(keyword: impl Into<String>, wgname: impl Into<String>) -> Self {
        Self {
            wgname: Some(wgname.into()),
            ..Self::new(keyword)
        }
    }

    pub fn for_number(keyword: impl Into<String>, number: i64) -> Self {
        Self {
            number: Some(number),
            ..Self::new(keyword)
        }
    }

    pub fn at(mut self, filename: impl Into<String>, lineno: u32) -> Self {
        self.location = Location {
            filename: filename.into(),
            lineno,
        };
        self
    }
}

/// Aggregation scope of a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Well,
    Group,
    Field,
    Region,
    Block,
    Connection,
    Segment,
    Aquifer,
    Node,
    Miscellaneous,
}

/// Physical flavour of a vector; decides efficiency-factor handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Kind {
    Rate,
    Total,
    Ratio,
    Pressure,
    Mode,
    #[default]
    Undefined,
}

/// Fully-classified identity of one output vector. Immutable once built;
/// `(keyword, wgname, number)` is the lookup key into the accumulation
/// store.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryNode {
    pub keyword: String,
    pub category: Category,
    pub kind: Kind,
    pub wgname: Option<String>,
    pub number: i64,
    /// Secondary region for inter-region flow vectors.
    pub fip_region2: Option<i64>,
}

impl SummaryNode {
    /// Key under which this vector's value lives in the summary state.
    pub fn unique_key(&self) -> String {
        match self.category {
            Category::Well | Category::Group | Category::Node => {
                format!("{}:{}", self.keyword, self.name())
            }
            Category::Connection | Category::Segment => {
                format!("{}:{}:{}", self.keyword, self.name(), self.number)
            }
            Category::Region if self.fip_region2.is_some() => {
                format!(
                    "{}:{}-{}",
                    self.keyword,
                    self.number,
                    self.fip_region2.unwrap_or_default()
                )
            }
            Category::Region | Category::Block | Category::Aquifer => {
                format!("{}:{}", self.keyword, self.number)
            }
            Category::Field | Category::Miscellaneous => self.keyword.clone(),
        }
    }

    pub fn name(&self) -> &str {
        self.wgname.as_deref().unwrap_or("")
    }

    /// UDQ convention: second character `U` marks a user-defined quantity.
    pub fn is_user_defined(keyword: &str) -> bool {
        keyword.as_bytes().get(1) == Some(&b'U')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(keyword: &str, category: Category) -> SummaryNode {
        SummaryNode {
            keyword: keyword.to_owned(),
            category,
            kind: Kind::Undefined,
            wgname: None,
            number: 0,
            fip_region2: None,
        }
    }

    #[test]
    fn unique_keys_by_category() {
        let mut w = node("WOPR", Category::Well);
        w.wgname = Some("OP01".to_owned());
        assert_eq!(w.unique_key(), "WOPR:OP01");

        let mut c = node("COPR", Category::Connection);
        c.wgname = Some("OP01".to_owned());
        c.number = 7;
        assert_eq!(c.unique_key(), "COPR:OP01:7");

        let mut r = node("RPR", Category::Region);
        r.number = 3;
        assert_eq!(r.unique_key(), "RPR:3");

        let mut rr = node("ROFT", Category::Region);
        rr.number = 1;
        rr.fip_region2 = Some(2);
        assert_eq!(rr.unique_key(), "ROFT:1-2");

        assert_eq!(node("FOPT", Category::Field).unique_key(), "FOPT");
    }

    #[test]
    fn user_defined_convention() {
        assert!(SummaryNode::is_user_defined("WUBHP"));
        assert!(SummaryNode::is_user_defined("FUALQ"));
        assert!(!SummaryNode::is_user_defined("WOPR"));
    }
}
