use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API name of the record type stored for every student.
pub const STUDENT_OBJECT: &str = "Student__c";

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(StudentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    DateOfBirth,
    Sex,
    Languages,
    Country,
    Hobbies,
}

impl FieldName {
    /// Display order of the creation form.
    pub const ALL: [FieldName; 6] = [
        FieldName::Name,
        FieldName::DateOfBirth,
        FieldName::Sex,
        FieldName::Languages,
        FieldName::Country,
        FieldName::Hobbies,
    ];

    pub fn api_name(self) -> &'static str {
        match self {
            FieldName::Name => "Name__c",
            FieldName::DateOfBirth => "DOB__c",
            FieldName::Sex => "Sex__c",
            FieldName::Languages => "Languages__c",
            FieldName::Country => "Country__c",
            FieldName::Hobbies => "Hobbies__c",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldName::Name => "Name",
            FieldName::DateOfBirth => "Date of Birth",
            FieldName::Sex => "Sex",
            FieldName::Languages => "Languages",
            FieldName::Country => "Country",
            FieldName::Hobbies => "Hobbies",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown student field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FieldName {
    type Err = UnknownField;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "name" | "name__c" => Ok(FieldName::Name),
            "dob" | "date_of_birth" | "dob__c" | "date_of_birth__c" => Ok(FieldName::DateOfBirth),
            "sex" | "sex__c" => Ok(FieldName::Sex),
            "languages" | "languages__c" => Ok(FieldName::Languages),
            "country" | "country__c" => Ok(FieldName::Country),
            "hobbies" | "hobbies__c" => Ok(FieldName::Hobbies),
            _ => Err(UnknownField(raw.to_string())),
        }
    }
}

/// Editable attributes of a student, as raw form values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    #[serde(rename = "Name__c", default)]
    pub name: String,
    #[serde(rename = "DOB__c", default)]
    pub date_of_birth: String,
    #[serde(rename = "Sex__c", default)]
    pub sex: String,
    #[serde(rename = "Languages__c", default)]
    pub languages: String,
    #[serde(rename = "Country__c", default)]
    pub country: String,
    #[serde(rename = "Hobbies__c", default)]
    pub hobbies: String,
}

impl StudentFields {
    pub fn get(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::DateOfBirth => &self.date_of_birth,
            FieldName::Sex => &self.sex,
            FieldName::Languages => &self.languages,
            FieldName::Country => &self.country,
            FieldName::Hobbies => &self.hobbies,
        }
    }

    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        let slot = match field {
            FieldName::Name => &mut self.name,
            FieldName::DateOfBirth => &mut self.date_of_birth,
            FieldName::Sex => &mut self.sex,
            FieldName::Languages => &mut self.languages,
            FieldName::Country => &mut self.country,
            FieldName::Hobbies => &mut self.hobbies,
        };
        *slot = value.into();
    }

    pub fn with(mut self, field: FieldName, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

/// A persisted student. The id is assigned by the record store and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "Id")]
    id: StudentId,
    #[serde(flatten)]
    pub fields: StudentFields,
}

impl Student {
    pub fn new(id: StudentId, fields: StudentFields) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> &StudentId {
        &self.id
    }

    pub fn into_parts(self) -> (StudentId, StudentFields) {
        (self.id, self.fields)
    }
}
