//! Member directory shown on the home page

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub id: u32,
    pub name: &'static str,
    pub username: &'static str,
    pub avatar: &'static str,
}

const MEMBERS: &[DirectoryEntry] = &[
    DirectoryEntry {
        id: 1,
        name: "Jonny Bates",
        username: "@jonnyabates",
        avatar: "/avatars/jonnyabates.png",
    },
    DirectoryEntry {
        id: 2,
        name: "Neter",
        username: "@neter",
        avatar: "/avatars/neter.png",
    },
];

pub fn default_directory() -> &'static [DirectoryEntry] {
    MEMBERS
}

/// Case-insensitive match on name or username; a blank query matches everyone
pub fn search<'a>(entries: &'a [DirectoryEntry], query: &str) -> Vec<&'a DirectoryEntry> {
    let query = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            query.is_empty()
                || entry.name.to_lowercase().contains(&query)
                || entry.username.to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search() {
        let entries = default_directory();
        assert_eq!(search(entries, "").len(), 2);
        assert_eq!(search(entries, "JONNY")[0].id, 1);
        assert_eq!(search(entries, "@neter")[0].name, "Neter");
        assert!(search(entries, "nobody").is_empty());
    }
}
