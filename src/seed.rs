use chrono::{DateTime, TimeZone, Utc};

use crate::models::{Location, Project, ProjectStatus, Role, Theme, User, Vote};

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "1".to_string(),
            email: "demo@evry.fr".to_string(),
            password: "demo".to_string(),
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            role: Role::User,
        },
        User {
            id: "2".to_string(),
            email: "admin@evry.fr".to_string(),
            password: "admin".to_string(),
            first_name: "Admin".to_string(),
            last_name: "Système".to_string(),
            role: Role::Admin,
        },
    ]
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: "1".to_string(),
            title: "Shared garden in the Épinettes district".to_string(),
            short_description: "\
                A shared garden in the heart of the district to grow vegetables and neighbourly \
                ties"
                .to_string(),
            full_description: "\
Turn an unused 200 m² plot into a shared garden open to every resident of the Épinettes district.

## Goals
- Create a friendly meeting place for residents
- Encourage local fruit and vegetable growing
- Raise awareness of urban agriculture
- Bring a neglected space back to life

## Planned layout
- 10 individual plots of 8 m² each
- A common area with fruit trees
- A shared composter
- A tool shed
- A rainwater collection system
- Benches and a picnic table

## How it will run
A residents' association will manage the garden. Plots are allotted for one renewable year to \
residents who help maintain the common areas."
                .to_string(),
            budget: 25_000,
            location: Location { latitude: 48.6304, longitude: 2.4507 },
            themes: ids(&["1", "2"]),
            images: ids(&["garden-1.jpg", "garden-2.jpg", "garden-3.jpg"]),
            submitted_by: "1".to_string(),
            submission_date: day(2025, 2, 15),
            status: ProjectStatus::Approved,
            votes: 87,
            updated_at: None,
        },
        Project {
            id: "2".to_string(),
            title: "Renovating the park basketball court".to_string(),
            short_description: "\
                Restore the basketball court so young people can play their favourite sport again"
                .to_string(),
            full_description: "\
## About
The municipal park court is heavily used but has worn down over the years. This project renovates \
it fully for players of every age.

## Planned works
- Resurface the court
- New backboards and hoops
- Repaint lines to current standards
- Energy-efficient LED lighting
- Benches for spectators

## Expected benefits
- Encourage sport among young people
- A meeting place across generations
- Less noise thanks to a suitable surface"
                .to_string(),
            budget: 18_000,
            location: Location { latitude: 48.6280, longitude: 2.4530 },
            themes: ids(&["5", "3"]),
            images: ids(&["court-1.jpg", "court-2.jpg"]),
            submitted_by: "1".to_string(),
            submission_date: day(2025, 2, 20),
            status: ProjectStatus::Approved,
            votes: 64,
            updated_at: None,
        },
        Project {
            id: "3".to_string(),
            title: "Bicycle repair stations".to_string(),
            short_description: "\
                Public self-service stations where cyclists can fix their bikes"
                .to_string(),
            full_description: "\
## About
Install 5 self-service bicycle repair stations at key spots in town.

## Station equipment
- An air pump
- Allen keys and screwdrivers
- Tyre levers
- A stand holding the bike during repairs

## Proposed sites
- In front of the station
- Market square
- University campus
- Sports park
- Shopping centre"
                .to_string(),
            budget: 12_000,
            location: Location { latitude: 48.6250, longitude: 2.4490 },
            themes: ids(&["6", "1"]),
            images: ids(&["bikes-1.jpg", "bikes-2.jpg"]),
            submitted_by: "2".to_string(),
            submission_date: day(2025, 3, 5),
            status: ProjectStatus::Approved,
            votes: 53,
            updated_at: None,
        },
        Project {
            id: "4".to_string(),
            title: "Collaborative mural".to_string(),
            short_description: "\
                Residents paint an artistic mural to brighten up an unsightly wall"
                .to_string(),
            full_description: "\
## About
An artistic, participatory project turning a grey, damaged wall into a collective work of art.

## Steps
- Design workshops with residents
- Collective choice of the final design
- Wall preparation by technical services
- Painting with a professional artist
- Opening celebration with the participants"
                .to_string(),
            budget: 8_000,
            location: Location { latitude: 48.6270, longitude: 2.4510 },
            themes: ids(&["4", "8"]),
            images: ids(&["mural-1.jpg"]),
            submitted_by: "1".to_string(),
            submission_date: day(2025, 3, 12),
            status: ProjectStatus::UnderReview,
            votes: 41,
            updated_at: None,
        },
        Project {
            id: "5".to_string(),
            title: "Air quality sensors".to_string(),
            short_description: "\
                Connected sensors to measure air quality and keep residents informed"
                .to_string(),
            full_description: "\
## About
Deploy a network of connected sensors measuring air quality in real time across several districts.

## Technical details
- 10 sensors for fine particles, ozone, CO2 and other pollutants
- A mobile app to browse the data
- Readings shown on existing information boards

## Goals
- Raise awareness of air quality
- Help residents plan outdoor activities
- Find the most polluted areas to target future action"
                .to_string(),
            budget: 15_000,
            location: Location { latitude: 48.6290, longitude: 2.4520 },
            themes: ids(&["1", "10"]),
            images: ids(&["air-1.jpg", "air-2.jpg"]),
            submitted_by: "2".to_string(),
            submission_date: day(2025, 2, 28),
            status: ProjectStatus::Approved,
            votes: 38,
            updated_at: None,
        },
    ]
}

pub fn votes() -> Vec<Vote> {
    vec![Vote {
        id: "1".to_string(),
        user_id: "1".to_string(),
        project_id: "1".to_string(),
        date: day(2025, 6, 15),
    }]
}

const fn theme(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    color: &'static str,
    order: u8,
) -> Theme {
    Theme {
        id,
        name,
        description,
        icon,
        color,
        order,
        is_active: true,
    }
}

pub static THEMES: [Theme; 12] = [
    theme("1", "Environment", "Ecology and environment projects", "🌱", "#4CAF50", 1),
    theme("2", "Living environment", "Improving everyday surroundings", "🏙️", "#2196F3", 2),
    theme("3", "Education and youth", "Projects for young people and education", "🎓", "#FF9800", 3),
    theme("4", "Culture and heritage", "Heritage and cultural projects", "🎭", "#9C27B0", 4),
    theme("5", "Sport", "Sports facilities and activities", "⚽", "#F44336", 5),
    theme("6", "Mobility", "Getting around town", "🚲", "#3F51B5", 6),
    theme("7", "Prevention and safety", "Projects that keep residents safe", "🛡️", "#607D8B", 7),
    theme("8", "Solidarity", "Mutual aid and social inclusion", "🤝", "#E91E63", 8),
    theme("9", "Cleanliness", "Cleaner streets and public spaces", "🧹", "#00BCD4", 9),
    theme("10", "Health", "Health and well-being", "❤️", "#FF5722", 10),
    theme(
        "11",
        "Attractiveness and employment",
        "Economic development and jobs",
        "💼",
        "#795548",
        11,
    ),
    theme("12", "Housing", "Homes and housing", "🏠", "#FFEB3B", 12),
];
