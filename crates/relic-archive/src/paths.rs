//! Persistence path resolver.
//!
//! Every resource of an archive group is stored as a content file plus a
//! JSON header in the hidden metadata directory. The mapping is fixed:
//!
//! | role | header | content |
//! |---|---|---|
//! | object root | `.fcrepo/fcr-root.json` | `fcr-container.nt` |
//! | binary | `.fcrepo/{name}.json` | `{name}` |
//! | binary description | `.fcrepo/{name}~fcr-desc.json` | `{name}~fcr-desc.nt` |

/// Directory holding resource headers, separate from content.
pub const HIDDEN_DIR: &str = ".fcrepo";

const ROOT_HEADER: &str = ".fcrepo/fcr-root.json";
const ROOT_CONTENT: &str = "fcr-container.nt";
const DESCRIPTION_SUFFIX: &str = "~fcr-desc";

/// Kind of resource a path belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceRole {
    ObjectRoot,
    Binary,
    BinaryDescription,
}

/// Header path for a resource. `name` is ignored for the object root.
pub fn header_path(role: ResourceRole, name: &str) -> String {
    match role {
        ResourceRole::ObjectRoot => ROOT_HEADER.to_string(),
        ResourceRole::Binary => format!("{HIDDEN_DIR}/{name}.json"),
        ResourceRole::BinaryDescription => format!("{HIDDEN_DIR}/{name}{DESCRIPTION_SUFFIX}.json"),
    }
}

/// Content path for a resource. `name` is ignored for the object root.
pub fn content_path(role: ResourceRole, name: &str) -> String {
    match role {
        ResourceRole::ObjectRoot => ROOT_CONTENT.to_string(),
        ResourceRole::Binary => name.to_string(),
        ResourceRole::BinaryDescription => format!("{name}{DESCRIPTION_SUFFIX}.nt"),
    }
}

pub fn root_header_path() -> String {
    header_path(ResourceRole::ObjectRoot, "")
}

pub fn root_content_path() -> String {
    content_path(ResourceRole::ObjectRoot, "")
}

pub fn binary_header_path(name: &str) -> String {
    header_path(ResourceRole::Binary, name)
}

pub fn binary_content_path(name: &str) -> String {
    content_path(ResourceRole::Binary, name)
}

pub fn description_header_path(name: &str) -> String {
    header_path(ResourceRole::BinaryDescription, name)
}

pub fn description_content_path(name: &str) -> String {
    content_path(ResourceRole::BinaryDescription, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fixed_paths() {
        assert_eq!(root_header_path(), ".fcrepo/fcr-root.json");
        assert_eq!(root_content_path(), "fcr-container.nt");
        assert_eq!(binary_header_path("DS1"), ".fcrepo/DS1.json");
        assert_eq!(binary_content_path("DS1"), "DS1");
        assert_eq!(description_header_path("DS1"), ".fcrepo/DS1~fcr-desc.json");
        assert_eq!(description_content_path("DS1"), "DS1~fcr-desc.nt");
        assert_eq!(binary_content_path("DS1.pdf"), "DS1.pdf");
    }

    proptest! {
        #[test]
        fn paths_depend_only_on_name(name in "[A-Za-z0-9._-]{1,24}") {
            prop_assert_eq!(binary_content_path(&name), binary_content_path(&name.clone()));
            prop_assert_eq!(binary_header_path(&name), format!(".fcrepo/{name}.json"));
            prop_assert!(binary_header_path(&name).starts_with(HIDDEN_DIR));
            prop_assert!(!binary_content_path(&name).starts_with(HIDDEN_DIR));
            prop_assert_ne!(description_content_path(&name), binary_content_path(&name));
        }
    }
}
