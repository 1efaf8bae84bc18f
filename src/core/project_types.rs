use std::collections::HashSet;

use lazy_static::lazy_static;

/// General project types a student may attach to a thesis title
pub const PROJECT_TYPES: &[&str] = &[
    "Web App",
    "Mobile App",
    "Desktop Application",
    "IoT System",
    "Data Analytics / Data Science",
    "AI / Machine Learning",
    "Chatbot / NLP",
    "Game Development",
    "Augmented Reality / Virtual Reality",
    "Embedded Systems",
    "Networking / Cybersecurity",
    "Automation / Robotics",
    "Information System",
    "Decision Support System",
    "Expert System",
    "Recommender System",
    "Blockchain App",
    "E-commerce System",
];

lazy_static! {
    static ref KNOWN_TYPES: HashSet<&'static str> = PROJECT_TYPES.iter().copied().collect();
}

pub fn is_known_project_type(tag: &str) -> bool {
    KNOWN_TYPES.contains(tag.trim())
}

/// Tags that are not in the catalog, in input order
pub fn unknown_project_types<'a>(tags: &'a [String]) -> Vec<&'a str> {
    tags.iter()
        .map(String::as_str)
        .filter(|t| !is_known_project_type(t))
        .collect()
}
