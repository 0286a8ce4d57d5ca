//! Invalidation tags.
//!
//! A tag is either a whole resource type or one instance of it. Invalidating a
//! type-only tag reaches every entry tagged with that type, with or without an
//! id; invalidating a tag with an id reaches only entries carrying exactly that
//! id.

use std::fmt;

/// Closed catalog of tag types known to the portal API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagType {
    Auth,
    Notice,
    Achievement,
    Homepage,
    Event,
    Post,
    Society,
    SocietyMembers,
    Alumni,
    User,
    Faculty,
    Student,
    Transaction,
    FinanceSummary,
    Payment,
    Application,
    WorkAssignment,
    Product,
    Project,
    EmailLog,
    ImportantData,
}

impl TagType {
    pub const ALL: [TagType; 21] = [
        TagType::Auth,
        TagType::Notice,
        TagType::Achievement,
        TagType::Homepage,
        TagType::Event,
        TagType::Post,
        TagType::Society,
        TagType::SocietyMembers,
        TagType::Alumni,
        TagType::User,
        TagType::Faculty,
        TagType::Student,
        TagType::Transaction,
        TagType::FinanceSummary,
        TagType::Payment,
        TagType::Application,
        TagType::WorkAssignment,
        TagType::Product,
        TagType::Project,
        TagType::EmailLog,
        TagType::ImportantData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagType::Auth => "Auth",
            TagType::Notice => "Notice",
            TagType::Achievement => "Achievement",
            TagType::Homepage => "Homepage",
            TagType::Event => "Event",
            TagType::Post => "Post",
            TagType::Society => "Society",
            TagType::SocietyMembers => "SocietyMembers",
            TagType::Alumni => "Alumni",
            TagType::User => "User",
            TagType::Faculty => "Faculty",
            TagType::Student => "Student",
            TagType::Transaction => "Transaction",
            TagType::FinanceSummary => "FinanceSummary",
            TagType::Payment => "Payment",
            TagType::Application => "Application",
            TagType::WorkAssignment => "WorkAssignment",
            TagType::Product => "Product",
            TagType::Project => "Project",
            TagType::EmailLog => "EmailLog",
            TagType::ImportantData => "ImportantData",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    ByType(TagType),
    ByTypeAndId(TagType, String),
}

impl Tag {
    pub fn of(tag_type: TagType) -> Self {
        Tag::ByType(tag_type)
    }

    pub fn id(tag_type: TagType, id: impl Into<String>) -> Self {
        Tag::ByTypeAndId(tag_type, id.into())
    }

    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::ByType(t) | Tag::ByTypeAndId(t, _) => *t,
        }
    }

    /// Whether invalidating `self` reaches an entry tagged with `provided`.
    pub fn invalidates(&self, provided: &Tag) -> bool {
        match self {
            Tag::ByType(t) => provided.tag_type() == *t,
            Tag::ByTypeAndId(..) => self == provided,
        }
    }
}

impl From<TagType> for Tag {
    fn from(tag_type: TagType) -> Self {
        Tag::ByType(tag_type)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::ByType(t) => write!(f, "{t}"),
            Tag::ByTypeAndId(t, id) => write!(f, "{t}:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_only_invalidation_reaches_every_instance() {
        let coarse = Tag::of(TagType::Society);
        assert!(coarse.invalidates(&Tag::of(TagType::Society)));
        assert!(coarse.invalidates(&Tag::id(TagType::Society, "42")));
        assert!(!coarse.invalidates(&Tag::of(TagType::Event)));
    }

    #[test]
    fn id_invalidation_does_not_widen_to_type() {
        let fine = Tag::id(TagType::SocietyMembers, "MEMBERS-123");
        assert!(fine.invalidates(&Tag::id(TagType::SocietyMembers, "MEMBERS-123")));
        assert!(!fine.invalidates(&Tag::id(TagType::SocietyMembers, "MEMBERS-7")));
        assert!(!fine.invalidates(&Tag::of(TagType::SocietyMembers)));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Tag::of(TagType::Notice).to_string(), "Notice");
        assert_eq!(Tag::id(TagType::Post, "p1").to_string(), "Post:p1");
    }

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = TagType::ALL.iter().map(|t| t.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TagType::ALL.len());
    }
}
