//! Template table and loading

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{DuplicateKeyError, Problem, TemplateError, ValidationError};
use super::records::{self, ProjectileTemplate, ShipTemplate, Template, WeaponTemplate};
use super::value::{derived_reference, template_reference, FieldValue, RawDocument, RawFields, RawValue};
use crate::config::Format;
use crate::types::TypeRegistry;

/// Where a template document comes from
#[derive(Debug, Clone)]
pub enum Source {
    /// A `.toml` or `.ron` file
    File(PathBuf),
    /// A document held in memory
    Text {
        /// Name used in logs and errors
        origin: String,
        /// Syntax of `contents`
        format: Format,
        /// The document
        contents: String,
    },
}

impl Source {
    /// Source for a file on disk
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Source for an in-memory document
    pub fn text(origin: impl Into<String>, format: Format, contents: impl Into<String>) -> Self {
        Self::Text {
            origin: origin.into(),
            format,
            contents: contents.into(),
        }
    }

    /// Name used in logs and errors
    pub fn origin(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Text { origin, .. } => origin.clone(),
        }
    }

    fn read(&self) -> Result<(Format, Cow<'_, str>), TemplateError> {
        match self {
            Self::File(path) => {
                let format =
                    Format::from_path(path).ok_or_else(|| TemplateError::UnsupportedFormat(path.clone()))?;
                let contents = fs::read_to_string(path).map_err(|source| TemplateError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok((format, Cow::Owned(contents)))
            }
            Self::Text { format, contents, .. } => Ok((*format, Cow::Borrowed(contents.as_str()))),
        }
    }
}

struct Entry {
    template: Template,
    declared: RawFields,
    origin: String,
}

/// Every loaded template, keyed by its globally unique key.
///
/// Templates are resolved as they are loaded, so a template may only refer
/// to templates loaded before it. Load categories in dependency order
/// (projectiles, weapons, ships).
pub struct TemplateRegistry {
    types: Arc<TypeRegistry>,
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

impl TemplateRegistry {
    /// Create an empty table resolving kinds through `types`
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            types,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Kind registry used for resolution
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Parse one document of `category` and register its templates.
    ///
    /// Records are processed in kind then key order. The first failure aborts
    /// the load; templates registered before it stay registered.
    pub fn load(&mut self, category: &str, source: &Source) -> Result<Vec<Template>, TemplateError> {
        let origin = source.origin();
        let (format, contents) = source.read()?;
        let document: RawDocument = format.parse(&contents).map_err(|e| TemplateError::Parse {
            origin: origin.clone(),
            message: e.to_string(),
        })?;

        let mut loaded = Vec::new();
        for (kind, records) in document {
            for (key, declared) in records {
                loaded.push(self.define(&kind, &key, declared, &origin)?);
            }
        }

        log::info!("Loaded {} {} template(s) from {}", loaded.len(), category, origin);
        Ok(loaded)
    }

    /// Parse an in-memory document
    pub fn load_str(&mut self, category: &str, format: Format, contents: &str) -> Result<Vec<Template>, TemplateError> {
        self.load(category, &Source::text(format!("<{category}>"), format, contents))
    }

    /// Parse one file
    pub fn load_file(&mut self, category: &str, path: impl AsRef<Path>) -> Result<Vec<Template>, TemplateError> {
        self.load(category, &Source::file(path.as_ref()))
    }

    /// Load every category directory under `root` in the given order.
    /// Within a category, files are loaded sorted by name.
    pub fn load_all<S: AsRef<str>>(&mut self, root: impl AsRef<Path>, order: &[S]) -> Result<usize, TemplateError> {
        let root = root.as_ref();
        let mut total = 0;

        for category in order {
            let category = category.as_ref();
            let dir = root.join(category);
            if !dir.is_dir() {
                return Err(TemplateError::MissingCategory(dir));
            }
            for path in template_files(&dir)? {
                total += self.load(category, &Source::File(path))?.len();
            }
        }

        log::info!("Loaded {} templates from {}", total, root.display());
        Ok(total)
    }

    /// Template registered under `key`
    pub fn get(&self, key: &str) -> Option<&Template> {
        self.entries.get(key).map(|entry| &entry.template)
    }

    /// Projectile template registered under `key`
    pub fn projectile(&self, key: &str) -> Option<Arc<ProjectileTemplate>> {
        self.get(key)?.as_projectile().cloned()
    }

    /// Weapon template registered under `key`
    pub fn weapon(&self, key: &str) -> Option<Arc<WeaponTemplate>> {
        self.get(key)?.as_weapon().cloned()
    }

    /// Ship template registered under `key`
    pub fn ship(&self, key: &str) -> Option<Arc<ShipTemplate>> {
        self.get(key)?.as_ship().cloned()
    }

    /// Source the template under `key` was loaded from
    pub fn origin_of(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|entry| entry.origin.as_str())
    }

    /// Keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build an unregistered copy of a registered template with some fields
    /// replaced. `reference` is written `Kind(key)` or `Kind[key]`.
    pub fn derive(&self, reference: &str, overrides: &RawFields) -> Result<Template, TemplateError> {
        let (kind, key) = derived_reference(reference)
            .or_else(|| template_reference(reference))
            .ok_or_else(|| {
                ValidationError::new("?", reference, Problem::UnknownReference(reference.to_string()))
            })?;

        self.derive_from(kind, key, overrides).map_err(|problem| match problem {
            Problem::InvalidDerivation(inner) => TemplateError::Validation(*inner),
            other => TemplateError::Validation(ValidationError::new(kind, key, other)),
        })
    }

    fn define(&mut self, kind: &str, key: &str, declared: RawFields, origin: &str) -> Result<Template, TemplateError> {
        if let Some(existing) = self.entries.get(key) {
            return Err(DuplicateKeyError {
                key: key.to_string(),
                origin: origin.to_string(),
                existing_origin: existing.origin.clone(),
            }
            .into());
        }

        let template = self.resolve(kind, key, &declared)?;

        log::debug!("Registered {}[{}] from {}", template.kind(), key, origin);
        self.entries.insert(
            key.to_string(),
            Entry {
                template: template.clone(),
                declared,
                origin: origin.to_string(),
            },
        );
        self.order.push(key.to_string());
        Ok(template)
    }

    /// Kind defaults, then declared fields, then the required-field check,
    /// then reference resolution, then the typed record
    fn resolve(&self, kind_name: &str, key: &str, declared: &RawFields) -> Result<Template, ValidationError> {
        let kind = self
            .types
            .lookup(kind_name)
            .ok_or_else(|| ValidationError::new(kind_name, key, Problem::UnknownKind(kind_name.to_string())))?;

        let mut merged: RawFields = kind
            .defaults
            .iter()
            .map(|&(name, value)| (name.to_string(), RawValue::from(value)))
            .collect();
        merged.extend(declared.iter().map(|(name, value)| (name.clone(), value.clone())));

        let missing: Vec<String> = kind
            .required_fields
            .iter()
            .filter(|field| !merged.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::new(kind.name, key, Problem::MissingFields(missing)));
        }

        let mut fields = BTreeMap::new();
        for (name, value) in &merged {
            let value = self
                .resolve_value(value)
                .map_err(|problem| ValidationError::new(kind.name, key, problem))?;
            fields.insert(name.clone(), value);
        }

        records::build(kind, key, &fields, self)
    }

    fn resolve_value(&self, value: &RawValue) -> Result<FieldValue, Problem> {
        match value {
            RawValue::Bool(b) => Ok(FieldValue::Bool(*b)),
            RawValue::Integer(i) => Ok(FieldValue::Number(*i as f64)),
            RawValue::Float(f) => Ok(FieldValue::Number(*f)),
            RawValue::Text(text) => match template_reference(text) {
                Some((kind, key)) if self.types.lookup(kind).is_some() => {
                    self.reference(kind, key).map(FieldValue::Template)
                }
                _ => Ok(FieldValue::Text(text.clone())),
            },
            RawValue::List(items) => items
                .iter()
                .map(|item| self.resolve_value(item))
                .collect::<Result<_, _>>()
                .map(FieldValue::List),
            RawValue::Table(table) => {
                if let Some(template) = self.resolve_derived(table)? {
                    return Ok(FieldValue::Template(template));
                }
                table
                    .iter()
                    .map(|(name, item)| Ok((name.clone(), self.resolve_value(item)?)))
                    .collect::<Result<_, _>>()
                    .map(FieldValue::Table)
            }
        }
    }

    /// A one-entry table keyed `Kind(key)` is a derived template
    fn resolve_derived(&self, table: &RawFields) -> Result<Option<Template>, Problem> {
        if table.len() != 1 {
            return Ok(None);
        }
        let Some((header, body)) = table.iter().next() else {
            return Ok(None);
        };
        let Some((kind, key)) = derived_reference(header) else {
            return Ok(None);
        };
        if self.types.lookup(kind).is_none() {
            return Ok(None);
        }
        let RawValue::Table(overrides) = body else {
            return Err(Problem::MalformedDerivation(header.clone()));
        };
        self.derive_from(kind, key, overrides).map(Some)
    }

    fn derive_from(&self, kind: &str, key: &str, overrides: &RawFields) -> Result<Template, Problem> {
        let base = self.entry(kind, key)?;
        let mut declared = base.declared.clone();
        declared.extend(overrides.iter().map(|(name, value)| (name.clone(), value.clone())));

        let derived = self
            .resolve(base.template.kind().name, key, &declared)
            .map_err(|e| Problem::InvalidDerivation(Box::new(e)))?;
        log::debug!("Derived a modified copy of {}[{}]", base.template.kind(), key);
        Ok(derived)
    }

    fn reference(&self, kind_name: &str, key: &str) -> Result<Template, Problem> {
        self.entry(kind_name, key).map(|entry| entry.template.clone())
    }

    /// A registered template, checked against the kind written in the
    /// reference
    fn entry(&self, kind_name: &str, key: &str) -> Result<&Entry, Problem> {
        let written = format!("{kind_name}[{key}]");
        let kind = self
            .types
            .lookup(kind_name)
            .ok_or_else(|| Problem::UnknownKind(kind_name.to_string()))?;
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| Problem::UnknownReference(written.clone()))?;

        let found = entry.template.kind();
        if !kind.accepts(found) {
            return Err(Problem::WrongFamily {
                reference: written,
                expected: kind.name.to_string(),
                found: found.name.to_string(),
            });
        }
        Ok(entry)
    }
}

fn template_files(dir: &Path) -> Result<Vec<PathBuf>, TemplateError> {
    let io_error = |source: std::io::Error| TemplateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if !path.is_file() {
            continue;
        }
        if Format::from_path(&path).is_some() {
            files.push(path);
        } else {
            log::warn!("Skipping non-template file {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Family;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::new(Arc::new(TypeRegistry::builtin().unwrap()))
    }

    const PROJECTILES: &str = r#"
        [Projectile.bolt]
        imagepath = "bolt.png"
        speed = 400
        damage = 5
    "#;

    const WEAPONS: &str = r#"
        [Weapon.blaster]
        rate_of_fire = 4.0
        projectiles = ["Projectile[bolt]"]
    "#;

    #[test]
    fn test_defaults_applied() {
        let mut templates = registry();
        templates
            .load_str(
                "projectiles",
                Format::Toml,
                "[Projectile.pellet]\nimagepath = \"p.png\"\nspeed = 100",
            )
            .unwrap();

        let pellet = templates.projectile("pellet").unwrap();
        assert_eq!(pellet.damage, 1.0);
        assert_eq!(pellet.lifetime, None);
        assert_eq!(pellet.kind.name, "projectile");
    }

    #[test]
    fn test_each_missing_required_field_rejected() {
        let kinds: [(&str, &str, &[(&str, &str)]); 3] = [
            ("projectiles", "Projectile", &[("imagepath", "\"bolt.png\""), ("speed", "400")]),
            ("weapons", "Weapon", &[("rate_of_fire", "2.0"), ("projectiles", "[]")]),
            (
                "ships",
                "Ship",
                &[
                    ("imagepath", "\"ship.png\""),
                    ("acceleration", "50"),
                    ("max_speed", "100"),
                    ("weapons", "[]"),
                ],
            ),
        ];

        for (category, kind, fields) in kinds {
            for skipped in 0..fields.len() {
                let mut templates = registry();
                let body: String = fields
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skipped)
                    .map(|(_, (name, value))| format!("{name} = {value}\n"))
                    .collect();

                let err = templates
                    .load_str(category, Format::Toml, &format!("[{kind}.sample]\n{body}"))
                    .unwrap_err();
                let TemplateError::Validation(err) = err else {
                    panic!("expected a validation error for {kind}, got {err}");
                };
                assert_eq!(err.key, "sample");
                assert_eq!(
                    err.problem,
                    Problem::MissingFields(vec![fields[skipped].0.to_string()]),
                    "{kind} without {}",
                    fields[skipped].0
                );
                assert!(templates.is_empty());
            }
        }
    }

    #[test]
    fn test_field_order_irrelevant() {
        let mut templates = registry();
        templates
            .load_str(
                "ships",
                Format::Toml,
                r#"
                [Ship.hull]
                weapons = []
                max_speed = 100
                imagepath = "ship.png"
                acceleration = 50
                "#,
            )
            .unwrap();
        assert_eq!(templates.ship("hull").unwrap().max_speed, 100.0);
    }

    #[test]
    fn test_duplicate_key_in_one_source() {
        let mut templates = registry();
        let err = templates
            .load_str(
                "projectiles",
                Format::Ron,
                r#"{
                    "Projectile": { "shot": { "imagepath": "a.png", "speed": 1.0 } },
                    "Weapon": { "shot": { "rate_of_fire": 1.0, "projectiles": [] } },
                }"#,
            )
            .unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateKey(DuplicateKeyError { ref key, .. }) if key == "shot"));
    }

    #[test]
    fn test_duplicate_key_across_sources() {
        let mut templates = registry();
        templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();
        let err = templates
            .load(
                "projectiles",
                &Source::text("extra.toml", Format::Toml, PROJECTILES),
            )
            .unwrap_err();

        let TemplateError::DuplicateKey(err) = err else {
            panic!("expected a duplicate key error");
        };
        assert_eq!(err.key, "bolt");
        assert_eq!(err.origin, "extra.toml");
        assert_eq!(err.existing_origin, "<projectiles>");
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn test_redeclared_key_reported_before_its_body() {
        let mut templates = registry();
        templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();

        let err = templates
            .load(
                "projectiles",
                &Source::text("broken.toml", Format::Toml, "[Projectile.bolt]\nspeed = \"fast\""),
            )
            .unwrap_err();

        assert!(matches!(err, TemplateError::DuplicateKey(DuplicateKeyError { ref key, .. }) if key == "bolt"));
    }

    #[test]
    fn test_lookup_returns_shared_record() {
        let mut templates = registry();
        let loaded = templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();

        let bolt = templates.get("bolt").unwrap().clone();
        assert!(bolt.ptr_eq(&loaded[0]));
        assert_eq!(bolt.family(), Family::Projectile);

        templates.load_str("weapons", Format::Toml, WEAPONS).unwrap();
        assert!(!bolt.ptr_eq(templates.get("blaster").unwrap()));
    }

    #[test]
    fn test_reference_resolves_to_registered_template() {
        let mut templates = registry();
        templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();
        templates.load_str("weapons", Format::Toml, WEAPONS).unwrap();

        let blaster = templates.weapon("blaster").unwrap();
        let bolt = templates.projectile("bolt").unwrap();
        assert!(Arc::ptr_eq(&blaster.projectiles[0], &bolt));
        assert_eq!(templates.keys().collect::<Vec<_>>(), ["bolt", "blaster"]);
    }

    #[test]
    fn test_bare_key_in_template_list() {
        let mut templates = registry();
        templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();
        templates
            .load_str(
                "weapons",
                Format::Toml,
                "[Weapon.popgun]\nrate_of_fire = 1\nprojectiles = [\"bolt\"]",
            )
            .unwrap();

        let popgun = templates.weapon("popgun").unwrap();
        assert!(Arc::ptr_eq(&popgun.projectiles[0], &templates.projectile("bolt").unwrap()));
    }

    #[test]
    fn test_reference_loaded_out_of_order() {
        let mut templates = registry();
        let err = templates.load_str("weapons", Format::Toml, WEAPONS).unwrap_err();

        let TemplateError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(err.problem, Problem::UnknownReference("Projectile[bolt]".to_string()));
    }

    #[test]
    fn test_reference_of_wrong_family() {
        let mut templates = registry();
        templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();
        let err = templates
            .load_str(
                "weapons",
                Format::Toml,
                "[Weapon.odd]\nrate_of_fire = 1\nprojectiles = [\"Weapon[bolt]\"]",
            )
            .unwrap_err();

        let TemplateError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert!(matches!(err.problem, Problem::WrongFamily { ref found, .. } if found == "projectile"));
    }

    #[test]
    fn test_wrong_field_type() {
        let mut templates = registry();
        let err = templates
            .load_str(
                "projectiles",
                Format::Toml,
                "[Projectile.bad]\nimagepath = 3\nspeed = 10",
            )
            .unwrap_err();

        let TemplateError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(
            err.problem,
            Problem::WrongType {
                field: "imagepath".to_string(),
                expected: "a string",
                found: "a number",
            }
        );
        assert_eq!(err.to_string(), "projectile[bad]: field `imagepath` should be a string, found a number");
    }

    #[test]
    fn test_out_of_range_rate_of_fire() {
        let mut templates = registry();
        let err = templates
            .load_str(
                "weapons",
                Format::Toml,
                "[Weapon.jammed]\nrate_of_fire = 0\nprojectiles = []",
            )
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Validation(ValidationError { problem: Problem::OutOfRange { .. }, .. })
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let mut templates = registry();
        let err = templates
            .load_str("ships", Format::Toml, "[Asteroid.big]\nimagepath = \"a.png\"")
            .unwrap_err();
        let TemplateError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(err.problem, Problem::UnknownKind("Asteroid".to_string()));
    }

    #[test]
    fn test_derived_reference_is_unregistered_copy() {
        let mut templates = registry();
        templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();
        templates
            .load_str(
                "weapons",
                Format::Toml,
                r#"
                [Weapon.heavy]
                rate_of_fire = 2
                projectiles = [{ "Projectile(bolt)" = { damage = 20 } }]
                "#,
            )
            .unwrap();

        let heavy = templates.weapon("heavy").unwrap();
        let bolt = templates.projectile("bolt").unwrap();
        assert_eq!(heavy.projectiles[0].damage, 20.0);
        assert_eq!(heavy.projectiles[0].speed, bolt.speed);
        assert!(!Arc::ptr_eq(&heavy.projectiles[0], &bolt));
        assert_eq!(bolt.damage, 5.0);
        assert_eq!(templates.len(), 2);
    }

    #[test]
    fn test_derive_from_code() {
        let mut templates = registry();
        templates.load_str("projectiles", Format::Toml, PROJECTILES).unwrap();

        let overrides = RawFields::from([("speed".to_string(), RawValue::from(50.0))]);
        let slow = templates.derive("Projectile(bolt)", &overrides).unwrap();
        assert_eq!(slow.as_projectile().unwrap().speed, 50.0);

        let overrides = RawFields::from([("speed".to_string(), RawValue::from(-1.0))]);
        let err = templates.derive("Projectile[bolt]", &overrides).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Validation(ValidationError { problem: Problem::OutOfRange { .. }, .. })
        ));

        assert!(templates.derive("Projectile(missing)", &RawFields::new()).is_err());
    }

    #[test]
    fn test_parse_error_names_origin() {
        let mut templates = registry();
        let err = templates
            .load(
                "ships",
                &Source::text("broken.toml", Format::Toml, "[Ship.x\nimagepath = 1"),
            )
            .unwrap_err();
        assert!(matches!(err, TemplateError::Parse { ref origin, .. } if origin == "broken.toml"));
    }

    #[test]
    fn test_load_all_order_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        for category in ["projectiles", "weapons"] {
            fs::create_dir(dir.path().join(category)).unwrap();
        }
        fs::write(dir.path().join("projectiles/b.toml"), PROJECTILES).unwrap();
        fs::write(
            dir.path().join("projectiles/a.ron"),
            r#"{ "Projectile": { "dart": { "imagepath": "d.png", "speed": 10.0 } } }"#,
        )
        .unwrap();
        fs::write(dir.path().join("projectiles/notes.txt"), "not a template").unwrap();
        fs::write(dir.path().join("weapons/w.toml"), WEAPONS).unwrap();

        let mut templates = registry();
        let count = templates
            .load_all(dir.path(), &["projectiles", "weapons"])
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(templates.keys().collect::<Vec<_>>(), ["dart", "bolt", "blaster"]);
    }

    #[test]
    fn test_load_all_missing_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut templates = registry();
        let err = templates.load_all(dir.path(), &["projectiles"]).unwrap_err();
        assert!(matches!(err, TemplateError::MissingCategory(_)));
    }
}
