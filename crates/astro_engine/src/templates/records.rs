//! Typed, immutable template records

use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::{Problem, ValidationError};
use super::registry::TemplateRegistry;
use super::value::FieldValue;
use crate::types::{Family, TypeDescriptor};

/// Template for anything fired by a weapon
#[derive(Debug, Clone)]
pub struct ProjectileTemplate {
    /// Registry key
    pub key: String,
    /// Kind the template instantiates
    pub kind: &'static TypeDescriptor,
    /// Sprite path
    pub imagepath: String,
    /// Travel speed in pixels per second
    pub speed: f32,
    /// Hit points taken from whatever the projectile hits
    pub damage: f32,
    /// Seconds before the projectile expires on its own
    pub lifetime: Option<f32>,
}

/// Template for a ship-mounted weapon
#[derive(Debug, Clone)]
pub struct WeaponTemplate {
    /// Registry key
    pub key: String,
    /// Kind the template instantiates
    pub kind: &'static TypeDescriptor,
    /// Shots per second
    pub rate_of_fire: f32,
    /// Projectiles spawned per shot
    pub projectiles: Vec<Arc<ProjectileTemplate>>,
}

impl WeaponTemplate {
    /// Seconds between two shots
    pub fn cooldown(&self) -> f32 {
        1.0 / self.rate_of_fire
    }
}

/// Template for a ship
#[derive(Debug, Clone)]
pub struct ShipTemplate {
    /// Registry key
    pub key: String,
    /// Kind the template instantiates
    pub kind: &'static TypeDescriptor,
    /// Sprite path
    pub imagepath: String,
    /// Overlay drawn on the sprite while the ship accelerates
    pub engine_glow_imagepath: Option<String>,
    /// Velocity change in pixels per second squared
    pub acceleration: f32,
    /// Speed cap in pixels per second
    pub max_speed: f32,
    /// Starting hit points
    pub hp: f32,
    /// Mounted weapons
    pub weapons: Vec<Arc<WeaponTemplate>>,
}

/// Any resolved template
#[derive(Debug, Clone)]
pub enum Template {
    /// Projectile family
    Projectile(Arc<ProjectileTemplate>),
    /// Weapon family
    Weapon(Arc<WeaponTemplate>),
    /// Ship family
    Ship(Arc<ShipTemplate>),
}

impl Template {
    /// Key the template was declared under
    pub fn key(&self) -> &str {
        match self {
            Self::Projectile(t) => &t.key,
            Self::Weapon(t) => &t.key,
            Self::Ship(t) => &t.key,
        }
    }

    /// Kind the template instantiates
    pub fn kind(&self) -> &'static TypeDescriptor {
        match self {
            Self::Projectile(t) => t.kind,
            Self::Weapon(t) => t.kind,
            Self::Ship(t) => t.kind,
        }
    }

    /// Family of the template's kind
    pub fn family(&self) -> Family {
        self.kind().family
    }

    /// Projectile record, if this is one
    pub fn as_projectile(&self) -> Option<&Arc<ProjectileTemplate>> {
        match self {
            Self::Projectile(t) => Some(t),
            _ => None,
        }
    }

    /// Weapon record, if this is one
    pub fn as_weapon(&self) -> Option<&Arc<WeaponTemplate>> {
        match self {
            Self::Weapon(t) => Some(t),
            _ => None,
        }
    }

    /// Ship record, if this is one
    pub fn as_ship(&self) -> Option<&Arc<ShipTemplate>> {
        match self {
            Self::Ship(t) => Some(t),
            _ => None,
        }
    }

    /// Whether both handles point at the same record
    pub fn ptr_eq(&self, other: &Template) -> bool {
        match (self, other) {
            (Self::Projectile(a), Self::Projectile(b)) => Arc::ptr_eq(a, b),
            (Self::Weapon(a), Self::Weapon(b)) => Arc::ptr_eq(a, b),
            (Self::Ship(a), Self::Ship(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Build the typed record for `kind` out of merged, resolved fields
pub(crate) fn build(
    kind: &'static TypeDescriptor,
    key: &str,
    fields: &BTreeMap<String, FieldValue>,
    templates: &TemplateRegistry,
) -> Result<Template, ValidationError> {
    let reader = FieldReader {
        kind,
        key,
        fields,
        templates,
    };

    let template = match kind.family {
        Family::Projectile => Template::Projectile(Arc::new(build_projectile(&reader)?)),
        Family::Weapon => Template::Weapon(Arc::new(build_weapon(&reader)?)),
        Family::Ship => Template::Ship(Arc::new(build_ship(&reader)?)),
    };
    Ok(template)
}

fn build_projectile(reader: &FieldReader<'_>) -> Result<ProjectileTemplate, ValidationError> {
    reader.warn_unknown(&["imagepath", "speed", "damage", "lifetime"]);
    Ok(ProjectileTemplate {
        key: reader.key.to_string(),
        kind: reader.kind,
        imagepath: reader.text("imagepath")?,
        speed: reader.non_negative("speed")?,
        damage: reader.non_negative("damage")?,
        lifetime: reader
            .optional_number("lifetime")?
            .filter(|lifetime| *lifetime > 0.0),
    })
}

fn build_weapon(reader: &FieldReader<'_>) -> Result<WeaponTemplate, ValidationError> {
    reader.warn_unknown(&["rate_of_fire", "projectiles"]);
    Ok(WeaponTemplate {
        key: reader.key.to_string(),
        kind: reader.kind,
        rate_of_fire: reader.positive("rate_of_fire")?,
        projectiles: reader.template_list("projectiles", Family::Projectile, |t| {
            t.as_projectile().cloned()
        })?,
    })
}

fn build_ship(reader: &FieldReader<'_>) -> Result<ShipTemplate, ValidationError> {
    reader.warn_unknown(&[
        "imagepath",
        "engine_glow_imagepath",
        "acceleration",
        "max_speed",
        "hp",
        "weapons",
    ]);
    Ok(ShipTemplate {
        key: reader.key.to_string(),
        kind: reader.kind,
        imagepath: reader.text("imagepath")?,
        engine_glow_imagepath: reader.optional_text("engine_glow_imagepath")?,
        acceleration: reader.non_negative("acceleration")?,
        max_speed: reader.positive("max_speed")?,
        hp: reader.positive("hp")?,
        weapons: reader.template_list("weapons", Family::Weapon, |t| t.as_weapon().cloned())?,
    })
}

/// Typed access to the merged fields of one template
struct FieldReader<'a> {
    kind: &'static TypeDescriptor,
    key: &'a str,
    fields: &'a BTreeMap<String, FieldValue>,
    templates: &'a TemplateRegistry,
}

impl<'a> FieldReader<'a> {
    fn error(&self, problem: Problem) -> ValidationError {
        ValidationError::new(self.kind.name, self.key, problem)
    }

    fn wrong_type(&self, field: &str, expected: &'static str, found: &FieldValue) -> ValidationError {
        self.error(Problem::WrongType {
            field: field.to_string(),
            expected,
            found: found.describe(),
        })
    }

    fn required(&self, field: &str) -> Result<&'a FieldValue, ValidationError> {
        self.fields
            .get(field)
            .ok_or_else(|| self.error(Problem::MissingFields(vec![field.to_string()])))
    }

    fn warn_unknown(&self, known: &[&str]) {
        for field in self.fields.keys() {
            if !known.contains(&field.as_str()) {
                log::warn!("{}[{}]: ignoring unknown field `{}`", self.kind, self.key, field);
            }
        }
    }

    fn optional_number(&self, field: &str) -> Result<Option<f32>, ValidationError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(FieldValue::Number(n)) if n.is_finite() => Ok(Some(*n as f32)),
            Some(other) => Err(self.wrong_type(field, "a finite number", other)),
        }
    }

    fn number(&self, field: &str) -> Result<f32, ValidationError> {
        match self.required(field)? {
            FieldValue::Number(n) if n.is_finite() => Ok(*n as f32),
            other => Err(self.wrong_type(field, "a finite number", other)),
        }
    }

    fn non_negative(&self, field: &str) -> Result<f32, ValidationError> {
        let value = self.number(field)?;
        if value < 0.0 {
            return Err(self.error(Problem::OutOfRange {
                field: field.to_string(),
                requirement: "must not be negative",
            }));
        }
        Ok(value)
    }

    fn positive(&self, field: &str) -> Result<f32, ValidationError> {
        let value = self.number(field)?;
        if value <= 0.0 {
            return Err(self.error(Problem::OutOfRange {
                field: field.to_string(),
                requirement: "must be positive",
            }));
        }
        Ok(value)
    }

    fn optional_text(&self, field: &str) -> Result<Option<String>, ValidationError> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(FieldValue::Text(text)) => Ok(Some(text.clone())),
            Some(other) => Err(self.wrong_type(field, "a string", other)),
        }
    }

    fn text(&self, field: &str) -> Result<String, ValidationError> {
        match self.required(field)? {
            FieldValue::Text(text) => Ok(text.clone()),
            other => Err(self.wrong_type(field, "a string", other)),
        }
    }

    /// A list of templates of one family. Items are resolved references or
    /// bare keys of registered templates.
    fn template_list<T>(
        &self,
        field: &str,
        family: Family,
        pick: impl Fn(&Template) -> Option<Arc<T>>,
    ) -> Result<Vec<Arc<T>>, ValidationError> {
        let items = match self.required(field)? {
            FieldValue::List(items) => items,
            other => return Err(self.wrong_type(field, "a list of templates", other)),
        };

        let mut templates = Vec::with_capacity(items.len());
        for item in items {
            let template = match item {
                FieldValue::Template(template) => template.clone(),
                FieldValue::Text(key) => self
                    .templates
                    .get(key)
                    .cloned()
                    .ok_or_else(|| self.error(Problem::UnknownReference(key.clone())))?,
                other => return Err(self.wrong_type(field, "a list of templates", other)),
            };

            let record = pick(&template).ok_or_else(|| {
                self.error(Problem::WrongFamily {
                    reference: template.key().to_string(),
                    expected: family.to_string(),
                    found: template.kind().name.to_string(),
                })
            })?;
            templates.push(record);
        }
        Ok(templates)
    }
}
