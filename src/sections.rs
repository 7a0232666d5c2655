//! The fixed category domain. Sections are compile-time constants; they
//! define the set of valid feed filter values.

/// One category of posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub slug: &'static str,
    pub heading: &'static str,
    /// Icon reference, by name; resolution is a presentation concern.
    pub icon: &'static str,
    pub description: &'static str,
}

pub const SECTIONS: &[Section] = &[
    Section {
        slug: "projects",
        heading: "Projects",
        icon: "briefcase",
        description: "Innovative solutions and applications I've developed.",
    },
    Section {
        slug: "services",
        heading: "Services",
        icon: "settings",
        description: "Professional services I offer to help you achieve your goals.",
    },
    Section {
        slug: "research",
        heading: "Research",
        icon: "beaker",
        description: "Explorations into new ideas and technologies.",
    },
    Section {
        slug: "hobbies",
        heading: "Hobbies",
        icon: "palette",
        description: "Creative pursuits and personal interests.",
    },
    Section {
        slug: "tutorials",
        heading: "Tutorials",
        icon: "book-open",
        description: "Step-by-step guides and how-to articles.",
    },
    Section {
        slug: "technology",
        heading: "Tech",
        icon: "code",
        description: "Deep dives into specific technologies and concepts.",
    },
    Section {
        slug: "academics",
        heading: "Academics",
        icon: "brain",
        description: "Theoretical foundations and academic explorations.",
    },
];

/// Sentinel slug for the landing view; it aliases to the default section.
pub const HOME_SLUG: &str = "home";

/// Slug the home view falls back to.
pub const DEFAULT_SECTION_SLUG: &str = "services";

pub fn find(slug: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.slug == slug)
}

pub fn is_section(slug: &str) -> bool {
    find(slug).is_some()
}

/// Resolve a requested slug to a fetchable section slug. `home` aliases to
/// the default section (falling back to the first entry); unknown slugs
/// resolve to nothing.
pub fn resolve(slug: &str) -> Option<&'static str> {
    if slug == HOME_SLUG {
        return find(DEFAULT_SECTION_SLUG)
            .map(|s| s.slug)
            .or_else(|| SECTIONS.first().map(|s| s.slug));
    }
    find(slug).map(|s| s.slug)
}
