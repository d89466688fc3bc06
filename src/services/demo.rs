//! Fixed placeholder dogs shown on the photo page when the shelter has no
//! photos of its own. Adopting one never touches the database.

use serde::Serialize;

use crate::entities::dog::{DogSize, Sex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoDog {
    pub id: i32,
    pub name: &'static str,
    pub breed: &'static str,
    pub age: u32,
    pub sex: Sex,
    pub weight: f64,
    pub size: DogSize,
    pub sterilized: bool,
    pub good_with_children: bool,
    pub good_with_animals: bool,
    pub description: &'static str,
    pub shelter: &'static str,
    pub photo_url: String,
}

const SHELTER: &str = "Canile Municipale";

struct Entry {
    name: &'static str,
    breed: &'static str,
    age: u32,
    sex: Sex,
    weight: f64,
    size: DogSize,
    sterilized: bool,
    good_with_animals: bool,
    description: &'static str,
}

const DOGS: [Entry; 6] = [
    Entry {
        name: "Max",
        breed: "Labrador",
        age: 3,
        sex: Sex::Male,
        weight: 30.0,
        size: DogSize::Large,
        sterilized: true,
        good_with_animals: true,
        description: "Max is a very affectionate and playful labrador.",
    },
    Entry {
        name: "Luna",
        breed: "German Shepherd",
        age: 2,
        sex: Sex::Female,
        weight: 25.0,
        size: DogSize::Large,
        sterilized: true,
        good_with_animals: false,
        description: "Luna is a very clever and protective german shepherd.",
    },
    Entry {
        name: "Rocky",
        breed: "Bulldog",
        age: 4,
        sex: Sex::Male,
        weight: 20.0,
        size: DogSize::Medium,
        sterilized: true,
        good_with_animals: true,
        description: "Rocky is a calm and loving bulldog.",
    },
    Entry {
        name: "Bella",
        breed: "Beagle",
        age: 1,
        sex: Sex::Female,
        weight: 10.0,
        size: DogSize::Small,
        sterilized: false,
        good_with_animals: true,
        description: "Bella is a young and lively beagle.",
    },
    Entry {
        name: "Charlie",
        breed: "Golden Retriever",
        age: 5,
        sex: Sex::Male,
        weight: 32.0,
        size: DogSize::Large,
        sterilized: true,
        good_with_animals: true,
        description: "Charlie is a mature and quiet golden retriever.",
    },
    Entry {
        name: "Daisy",
        breed: "Poodle",
        age: 2,
        sex: Sex::Female,
        weight: 5.0,
        size: DogSize::Small,
        sterilized: true,
        good_with_animals: true,
        description: "Daisy is a very lively and affectionate toy poodle.",
    },
];

pub fn photo_url(id: i32) -> String {
    format!("https://placedog.net/500/280?id={id}")
}

/// Looks up a placeholder dog by its id, `1..=6`.
pub fn find(id: i32) -> Option<DemoDog> {
    let index = usize::try_from(id).ok()?.checked_sub(1)?;
    let entry = DOGS.get(index)?;
    Some(DemoDog {
        id,
        name: entry.name,
        breed: entry.breed,
        age: entry.age,
        sex: entry.sex,
        weight: entry.weight,
        size: entry.size,
        sterilized: entry.sterilized,
        good_with_children: true,
        good_with_animals: entry.good_with_animals,
        description: entry.description,
        shelter: SHELTER,
        photo_url: photo_url(id),
    })
}

pub fn all() -> Vec<DemoDog> {
    (1..=DOGS.len() as i32).filter_map(find).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_one_to_six_resolve() {
        let names: Vec<_> = all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["Max", "Luna", "Rocky", "Bella", "Charlie", "Daisy"]);
        assert_eq!(find(2).unwrap().photo_url, "https://placedog.net/500/280?id=2");
    }

    #[test]
    fn ids_outside_range_are_unknown() {
        assert!(find(0).is_none());
        assert!(find(7).is_none());
        assert!(find(-1).is_none());
    }
}
