// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory user and pet store.
//!
//! Shared as `Arc<RwLock<InMemoryStore>>` in [`AppState`](crate::state::AppState).
//! Mutations are all-or-nothing: every check runs before the first write.
//! Email uniqueness is case-insensitive.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use crate::models::{CreatePetRequest, Pet, PetId, User, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email {0} is already registered")]
    DuplicateEmail(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Fields of a user about to be registered.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub telephone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: HashMap<UserId, User>,
    pets: HashMap<PetId, Pet>,
    last_user_id: UserId,
    last_pet_id: PetId,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn pet_count(&self) -> usize {
        self.pets.len()
    }

    // ========== Users ==========

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }

    pub fn insert_user(&mut self, new: NewUser) -> Result<User, StoreError> {
        if self.user_by_email(&new.email).is_some() {
            return Err(StoreError::DuplicateEmail(new.email));
        }
        let id = next_id(&mut self.last_user_id, "user")?;
        let now = Utc::now();
        let user = User {
            id,
            name: new.name,
            surname: new.surname,
            email: new.email,
            password_hash: new.password_hash,
            telephone: new.telephone,
            whatsapp: new.whatsapp,
            address: new.address,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    /// Apply `change` to user `id`. The change runs on a copy; the stored
    /// record is replaced only if the result keeps the email unique.
    pub fn update_user<F>(&mut self, id: UserId, change: F) -> Result<User, StoreError>
    where
        F: FnOnce(&mut User),
    {
        let mut updated = self
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "user", id })?;
        change(&mut updated);
        updated.id = id;

        let taken = self
            .users
            .values()
            .any(|other| other.id != id && other.email.eq_ignore_ascii_case(&updated.email));
        if taken {
            return Err(StoreError::DuplicateEmail(updated.email));
        }

        updated.updated_at = Utc::now();
        self.users.insert(id, updated.clone());
        Ok(updated)
    }

    // ========== Pets ==========

    pub fn pet(&self, id: PetId) -> Option<&Pet> {
        self.pets.get(&id)
    }

    /// Pets owned by `owner_id`, ordered by id.
    pub fn pets_of(&self, owner_id: UserId) -> Vec<Pet> {
        let mut pets: Vec<Pet> = self
            .pets
            .values()
            .filter(|pet| pet.owner_id == owner_id)
            .cloned()
            .collect();
        pets.sort_by_key(|pet| pet.id);
        pets
    }

    pub fn insert_pet(&mut self, owner_id: UserId, request: CreatePetRequest) -> Result<Pet, StoreError> {
        if !self.users.contains_key(&owner_id) {
            return Err(StoreError::NotFound {
                entity: "user",
                id: owner_id,
            });
        }
        let id = next_id(&mut self.last_pet_id, "pet")?;
        let now = Utc::now();
        let pet = Pet {
            id,
            owner_id,
            name: request.name,
            species: request.species,
            birth_date: request.birth_date,
            gender: request.gender,
            weight_kg: request.weight_kg,
            color: request.color,
            neutered: request.neutered,
            breed: request.breed,
            photo_url: request.photo_url,
            created_at: now,
            updated_at: now,
        };
        self.pets.insert(id, pet.clone());
        Ok(pet)
    }

    pub fn update_pet<F>(&mut self, id: PetId, change: F) -> Result<Pet, StoreError>
    where
        F: FnOnce(&mut Pet),
    {
        let pet = self
            .pets
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "pet", id })?;
        let owner_id = pet.owner_id;
        change(pet);
        pet.id = id;
        pet.owner_id = owner_id;
        pet.updated_at = Utc::now();
        Ok(pet.clone())
    }

    pub fn delete_pet(&mut self, id: PetId) -> Result<Pet, StoreError> {
        self.pets
            .remove(&id)
            .ok_or(StoreError::NotFound { entity: "pet", id })
    }
}

fn next_id(last: &mut u64, entity: &str) -> Result<u64, StoreError> {
    let id = last
        .checked_add(1)
        .ok_or_else(|| StoreError::Unavailable(format!("{entity} id space exhausted")))?;
    *last = id;
    Ok(id)
}
