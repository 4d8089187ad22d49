// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Stored entities ([`User`], [`Pet`]) and the request/response shapes of the
//! REST API. All wire types derive `Serialize`/`Deserialize` and `ToSchema`.
//!
//! ## Validation
//!
//! Requests are validated before they reach the store. Limits:
//!
//! | Field | Rule |
//! |-------|------|
//! | user `name`, `surname`, `email` | non-blank, at most 100 chars |
//! | `email` | `local@domain.tld`, no whitespace |
//! | `password` | 8 to 100 chars |
//! | `telephone`, `whatsapp` | 10 or 11 digits |
//! | `address`, pet `photo_url` | at most 255 chars |
//! | pet text fields | non-blank, at most 50 chars (`neutered`: 3) |
//! | `weight_kg` | greater than 0, at most 999.99 |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::storage::OwnedResource;

pub type UserId = u64;
pub type PetId = u64;

/// Rejected request payload. The message names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

type Validated = Result<(), ValidationError>;

// =============================================================================
// Date format
// =============================================================================

/// Birth dates travel as `dd/mm/yyyy`.
mod day_month_year {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

// =============================================================================
// Stored entities
// =============================================================================

/// A registered account. The email is the account's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    pub password_hash: String,
    pub telephone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for User {
    fn owner_identity(&self) -> &str {
        &self.email
    }
}

/// A pet record owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pet {
    pub id: PetId,
    pub owner_id: UserId,
    pub name: String,
    pub species: String,
    #[serde(with = "day_month_year")]
    #[schema(value_type = String, example = "21/03/2020")]
    pub birth_date: NaiveDate,
    pub gender: String,
    pub weight_kg: f64,
    pub color: String,
    pub neutered: String,
    pub breed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Account requests
// =============================================================================

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Validated {
        required_text("name", &self.name, 100)?;
        required_text("surname", &self.surname, 100)?;
        email("email", &self.email)?;
        password(&self.password)?;
        optional_phone("telephone", self.telephone.as_deref())?;
        optional_phone("whatsapp", self.whatsapp.as_deref())?;
        optional_text("address", self.address.as_deref(), 255)
    }
}

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Opaque bearer token
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Plain confirmation body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `PUT /user/{id}`. Absent fields are left unchanged; an empty
/// password also leaves the password unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Validated {
        if let Some(name) = &self.name {
            required_text("name", name, 100)?;
        }
        if let Some(surname) = &self.surname {
            required_text("surname", surname, 100)?;
        }
        if let Some(value) = &self.email {
            email("email", value)?;
        }
        optional_phone("telephone", self.telephone.as_deref())?;
        optional_phone("whatsapp", self.whatsapp.as_deref())?;
        optional_text("address", self.address.as_deref(), 255)?;
        match self.new_password() {
            Some(value) => password(value),
            None => Ok(()),
        }
    }

    /// The password to set, if the request changes it.
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Copy the present fields onto `user`. The password is applied
    /// separately as an already-computed hash.
    pub fn apply(self, user: &mut User, password_hash: Option<String>) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(surname) = self.surname {
            user.surname = surname;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(telephone) = self.telephone {
            user.telephone = Some(telephone);
        }
        if let Some(whatsapp) = self.whatsapp {
            user.whatsapp = Some(whatsapp);
        }
        if let Some(address) = self.address {
            user.address = Some(address);
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
    }
}

/// Public view of a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            surname: user.surname,
            email: user.email,
            telephone: user.telephone,
            whatsapp: user.whatsapp,
            address: user.address,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A user together with the pets they own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserWithPetsResponse {
    pub user: UserResponse,
    pub pets: Vec<Pet>,
}

// =============================================================================
// Pet requests
// =============================================================================

/// Body of `POST /user/{id}/pets`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePetRequest {
    pub name: String,
    pub species: String,
    #[serde(with = "day_month_year")]
    #[schema(value_type = String, example = "21/03/2020")]
    pub birth_date: NaiveDate,
    pub gender: String,
    pub weight_kg: f64,
    pub color: String,
    pub neutered: String,
    pub breed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl CreatePetRequest {
    pub fn validate(&self) -> Validated {
        required_text("name", &self.name, 50)?;
        required_text("species", &self.species, 50)?;
        birth_date(self.birth_date)?;
        required_text("gender", &self.gender, 50)?;
        weight(self.weight_kg)?;
        required_text("color", &self.color, 50)?;
        required_text("neutered", &self.neutered, 3)?;
        required_text("breed", &self.breed, 50)?;
        optional_text("photo_url", self.photo_url.as_deref(), 255)
    }
}

/// Body of `PUT /user/{id}/pets/{pet_id}`. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(
        default,
        with = "day_month_year::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "21/03/2020")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl UpdatePetRequest {
    pub fn validate(&self) -> Validated {
        for (field, value, max) in [
            ("name", &self.name, 50),
            ("species", &self.species, 50),
            ("gender", &self.gender, 50),
            ("color", &self.color, 50),
            ("neutered", &self.neutered, 3),
            ("breed", &self.breed, 50),
        ] {
            if let Some(value) = value {
                required_text(field, value, max)?;
            }
        }
        if let Some(date) = self.birth_date {
            birth_date(date)?;
        }
        if let Some(kg) = self.weight_kg {
            weight(kg)?;
        }
        optional_text("photo_url", self.photo_url.as_deref(), 255)
    }

    pub fn apply(self, pet: &mut Pet) {
        if let Some(name) = self.name {
            pet.name = name;
        }
        if let Some(species) = self.species {
            pet.species = species;
        }
        if let Some(date) = self.birth_date {
            pet.birth_date = date;
        }
        if let Some(gender) = self.gender {
            pet.gender = gender;
        }
        if let Some(kg) = self.weight_kg {
            pet.weight_kg = kg;
        }
        if let Some(color) = self.color {
            pet.color = color;
        }
        if let Some(neutered) = self.neutered {
            pet.neutered = neutered;
        }
        if let Some(breed) = self.breed {
            pet.breed = breed;
        }
        if let Some(url) = self.photo_url {
            pet.photo_url = Some(url);
        }
    }
}

// =============================================================================
// Field rules
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> Validated {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }
    optional_text(field, Some(value), max)
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> Validated {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::new(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}

fn email(field: &str, value: &str) -> Validated {
    required_text(field, value, 100)?;
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        })
        && !value.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new(format!("{field} must be a valid email address")))
    }
}

fn password(value: &str) -> Validated {
    let len = value.chars().count();
    if (8..=100).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("password must be between 8 and 100 characters"))
    }
}

fn optional_phone(field: &str, value: Option<&str>) -> Validated {
    match value {
        Some(v) if !((10..=11).contains(&v.len()) && v.bytes().all(|b| b.is_ascii_digit())) => {
            Err(ValidationError::new(format!(
                "{field} must contain only digits and have 10 or 11 of them"
            )))
        }
        _ => Ok(()),
    }
}

fn birth_date(date: NaiveDate) -> Validated {
    if date > Utc::now().date_naive() {
        Err(ValidationError::new("birth_date cannot be in the future"))
    } else {
        Ok(())
    }
}

fn weight(kg: f64) -> Validated {
    if kg.is_finite() && kg > 0.0 && kg <= 999.99 {
        Ok(())
    } else {
        Err(ValidationError::new("weight_kg must be greater than 0 and less than 1000"))
    }
}
