//! Built-in info-topic catalog.
//!
//! # Responsibility
//! - Provide the read-only topic records behind the info screen.
//! - Provide the starter suggested-task set that links back into topics.
//!
//! # Invariants
//! - Topic ids are unique; task ids are unique across the whole catalog.
//! - Catalog tasks are always created incomplete.

use crate::model::task::Task;

/// One info topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoTopic {
    pub id: &'static str,
    pub title: &'static str,
    /// Lowest user level the topic is recommended for.
    pub relevant_level: u32,
    pub description: &'static str,
    pub tasks: Vec<Task>,
    pub sources: Vec<&'static str>,
}

impl InfoTopic {
    /// Whether the topic offers tasks that can be added to progress.
    pub fn has_actionable_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }
}

/// Returns every catalog topic in display order.
pub fn topics() -> Vec<InfoTopic> {
    vec![
        InfoTopic {
            id: "taxes",
            title: "Understanding Taxes",
            relevant_level: 0,
            description: "Learn about income tax, tax brackets, deductions, and how to file your first tax return.",
            tasks: vec![
                Task::new("tax-1", "Research your tax code"),
                Task::new("tax-2", "Keep records of work expenses"),
                Task::new("tax-3", "Learn about tax deductions"),
            ],
            sources: vec![
                "https://www.eu-gleichbehandlungsstelle.de/eugs-en/eu-citizens/information-center/taxes",
                "https://www.gov.uk/income-tax-rates",
            ],
        },
        InfoTopic {
            id: "payslip",
            title: "Reading Your Payslip",
            relevant_level: 0,
            description: "Understand gross pay, net pay, deductions, and what all those numbers mean.",
            tasks: vec![
                Task::new("payslip-1", "Identify your gross pay"),
                Task::new("payslip-2", "Understand your net pay"),
                Task::new("payslip-3", "Review all deductions"),
            ],
            sources: vec![
                "https://www.simplegermany.com/german-payslip-explained/",
                "https://www.firma.de/en/accountancy/lohnabrechnung-how-to-read-a-german-payslip/",
            ],
        },
        InfoTopic {
            id: "budgeting",
            title: "Creating a Budget",
            relevant_level: 1,
            description: "Learn the 50/30/20 rule and how to manage your money effectively.",
            tasks: vec![
                Task::new("budget-1", "Set up a monthly budget"),
                Task::new("budget-2", "Track your spending for a week"),
                Task::new("budget-3", "Apply the 50/30/20 rule"),
            ],
            sources: vec![
                "Dave Ramsey - Budget Planning Guide",
                "NerdWallet - Budgeting Basics",
                "YNAB (You Need A Budget)",
            ],
        },
        InfoTopic {
            id: "housing",
            title: "Renting Your First Place",
            relevant_level: 1,
            description: "What to know about rental contracts, deposits, and tenant rights.",
            tasks: vec![
                Task::new("housing-1", "Review rental contract terms"),
                Task::new("housing-2", "Learn about tenant rights"),
                Task::new("housing-3", "Document apartment condition"),
            ],
            sources: vec![
                "Shelter - Tenant Rights Guide",
                "Citizens Advice - Renting",
                "UK Government - Rented Housing Guide",
            ],
        },
        InfoTopic {
            id: "wellness",
            title: "Work-Life Balance",
            relevant_level: 0,
            description: "Tips for maintaining mental health and setting boundaries at work.",
            tasks: Vec::new(),
            sources: vec![
                "Mind - Work and Mental Health",
                "Mental Health Foundation",
                "ACAS - Work-Life Balance",
            ],
        },
    ]
}

/// Looks up one topic by id.
pub fn topic(id: &str) -> Option<InfoTopic> {
    let id = id.trim();
    topics().into_iter().find(|topic| topic.id == id)
}

/// Topics recommended at or below `level`.
pub fn topics_for_level(level: u32) -> Vec<InfoTopic> {
    topics()
        .into_iter()
        .filter(|topic| topic.relevant_level <= level)
        .collect()
}

/// Starter suggested tasks seeded into an empty suggested list.
pub fn seed_suggested_tasks() -> Vec<Task> {
    vec![
        Task::new("suggested-1", "Understanding Taxes").with_info_link("taxes"),
        Task::new("suggested-2", "Reading Your Payslip").with_info_link("payslip"),
        Task::new("suggested-3", "Creating a Budget").with_info_link("budget"),
    ]
}
