//! Static content: reputable health links, light meal ideas and the teen growth tip.

/// One external resource
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthResource {
    pub title: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

pub const HEALTH_RESOURCES: &[HealthResource] = &[
    HealthResource {
        title: "CDC Healthy Weight",
        url: "https://www.cdc.gov/healthyweight/index.html",
        description: "Reliable information on maintaining a healthy lifestyle.",
    },
    HealthResource {
        title: "MyPlate - USDA",
        url: "https://www.myplate.gov/",
        description: "Guidance on balanced eating and food groups.",
    },
    HealthResource {
        title: "KidsHealth",
        url: "https://kidshealth.org/",
        description: "Doctor-approved advice for kids, teens, and parents.",
    },
];

/// A light meal suggestion shown on the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MealIdea {
    pub name: &'static str,
    pub calories: u32,
    pub kind: &'static str,
}

pub const MEAL_IDEAS: &[MealIdea] = &[
    MealIdea {
        name: "Fruit Smoothie",
        calories: 210,
        kind: "Light & Easy",
    },
    MealIdea {
        name: "Greek Yogurt",
        calories: 150,
        kind: "Small Bite",
    },
    MealIdea {
        name: "Apple & PB",
        calories: 190,
        kind: "Light Snack",
    },
    MealIdea {
        name: "Hummus & Cuc",
        calories: 120,
        kind: "Refreshing",
    },
];

pub const GROWTH_TIP: &str = "Since you're still growing, focus on eating a variety of foods. \
Your body needs healthy fuel for brain development and physical growth!";

/// Teens still growing get the growth tip
pub fn shows_growth_tip(age: u32) -> bool {
    (crate::MINIMUM_AGE..=17).contains(&age)
}
