use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Single-valued text fields.
pub const STRING_FIELDS: &[&str] = &["q", "ordering", "author", "cuisine_type", "cooking_method"];

/// Numeric fields. `min_rating` is decimal, the rest are non-negative integers.
pub const NUMERIC_FIELDS: &[&str] = &[
    "min_prep_time",
    "max_prep_time",
    "min_cook_time",
    "max_cook_time",
    "min_rating",
    "min_servings",
    "max_servings",
    "page",
    "page_size",
];

/// Fields that repeat in a query string and travel as arrays in a JSON body.
pub const MULTI_VALUED_FIELDS: &[&str] = &[
    "categories",
    "category_slugs",
    "difficulty",
    "dietary_restrictions",
    "tags",
    "ingredients_include",
    "ingredients_exclude",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    MultiValued,
}

pub fn field_kind(name: &str) -> Option<FieldKind> {
    if STRING_FIELDS.contains(&name) {
        Some(FieldKind::Text)
    } else if name == "min_rating" {
        Some(FieldKind::Decimal)
    } else if NUMERIC_FIELDS.contains(&name) {
        Some(FieldKind::Integer)
    } else if MULTI_VALUED_FIELDS.contains(&name) {
        Some(FieldKind::MultiValued)
    } else {
        None
    }
}

/// User-supplied search and filter parameters. Every field is optional; `None`,
/// `""` and empty lists all mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub min_prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub max_prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub min_cook_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub max_cook_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub min_servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_integer")]
    pub max_servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_decimal")]
    pub min_rating: Option<f64>,

    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub category_slugs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub difficulty: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub dietary_restrictions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub ingredients_include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub ingredients_exclude: Vec<String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_category_slug(mut self, slug: impl Into<String>) -> Self {
        self.category_slugs.push(slug.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Strips every absent-equivalent value. The result is the only form that is
    /// ever sent to the backend or written into a shareable link.
    pub fn normalize(&self) -> NormalizedParams {
        let mut out = NormalizedParams::default();

        out.push_text("q", &self.q);
        out.push_text("ordering", &self.ordering);
        out.push_text("author", &self.author);
        out.push_text("cuisine_type", &self.cuisine_type);
        out.push_text("cooking_method", &self.cooking_method);

        out.push_integer("page", self.page);
        out.push_integer("page_size", self.page_size);
        out.push_integer("min_prep_time", self.min_prep_time);
        out.push_integer("max_prep_time", self.max_prep_time);
        out.push_integer("min_cook_time", self.min_cook_time);
        out.push_integer("max_cook_time", self.max_cook_time);
        out.push_integer("min_servings", self.min_servings);
        out.push_integer("max_servings", self.max_servings);
        out.push_decimal("min_rating", self.min_rating);

        out.push_list("categories", &self.categories);
        out.push_list("category_slugs", &self.category_slugs);
        out.push_list("difficulty", &self.difficulty);
        out.push_list("dietary_restrictions", &self.dietary_restrictions);
        out.push_list("tags", &self.tags);
        out.push_list("ingredients_include", &self.ingredients_include);
        out.push_list("ingredients_exclude", &self.ingredients_exclude);

        out
    }

    /// Applies one raw `key=value` pair, coercing by field kind. Returns `false`
    /// when the pair was dropped (unknown key, empty value, failed coercion).
    pub fn apply_raw(&mut self, key: &str, raw: &str) -> bool {
        if raw.is_empty() {
            return false;
        }

        match field_kind(key) {
            Some(FieldKind::Text) => self.set_text(key, raw.to_string()),
            Some(FieldKind::Integer) => match parse_integer(raw) {
                Some(value) => self.set_integer(key, value),
                None => false,
            },
            Some(FieldKind::Decimal) => match parse_decimal(raw) {
                Some(value) => {
                    self.min_rating = Some(value);
                    true
                }
                None => false,
            },
            Some(FieldKind::MultiValued) => self.push_list_value(key, raw.to_string()),
            None => false,
        }
    }

    fn set_text(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "q" => &mut self.q,
            "ordering" => &mut self.ordering,
            "author" => &mut self.author,
            "cuisine_type" => &mut self.cuisine_type,
            "cooking_method" => &mut self.cooking_method,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    fn set_integer(&mut self, key: &str, value: u32) -> bool {
        let slot = match key {
            "page" => &mut self.page,
            "page_size" => &mut self.page_size,
            "min_prep_time" => &mut self.min_prep_time,
            "max_prep_time" => &mut self.max_prep_time,
            "min_cook_time" => &mut self.min_cook_time,
            "max_cook_time" => &mut self.max_cook_time,
            "min_servings" => &mut self.min_servings,
            "max_servings" => &mut self.max_servings,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    fn push_list_value(&mut self, key: &str, value: String) -> bool {
        let list = match key {
            "categories" => &mut self.categories,
            "category_slugs" => &mut self.category_slugs,
            "difficulty" => &mut self.difficulty,
            "dietary_restrictions" => &mut self.dietary_restrictions,
            "tags" => &mut self.tags,
            "ingredients_include" => &mut self.ingredients_include,
            "ingredients_exclude" => &mut self.ingredients_exclude,
            _ => return false,
        };
        list.push(value);
        true
    }
}

/// Accepts `"24"` and `"24.0"`; rejects negatives, fractions and anything non-numeric.
fn parse_integer(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u32>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

// JSON input gets the same leniency as a shared link: `null`, `""` and values
// that do not coerce all read as "no filter".

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => parse_integer(&n.to_string()),
        Some(Value::String(s)) => parse_integer(&s),
        _ => None,
    })
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().filter(|value| value.is_finite()),
        Some(Value::String(s)) => parse_decimal(&s),
        _ => None,
    })
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(items.into_iter().flatten().flatten().collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(Number),
    List(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn query_values(&self) -> Vec<String> {
        match self {
            ParamValue::Text(s) => vec![s.clone()],
            ParamValue::Number(n) => vec![n.to_string()],
            ParamValue::List(items) => items.clone(),
        }
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Number(Number::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Parameters after normalization: only present values, keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedParams {
    fields: BTreeMap<String, ParamValue>,
}

impl NormalizedParams {
    fn push_text(&mut self, key: &str, value: &Option<String>) {
        if let Some(text) = value.as_deref().filter(|s| !s.is_empty()) {
            self.fields
                .insert(key.to_string(), ParamValue::Text(text.to_string()));
        }
    }

    fn push_integer(&mut self, key: &str, value: Option<u32>) {
        if let Some(number) = value {
            self.fields.insert(key.to_string(), ParamValue::from(number));
        }
    }

    fn push_decimal(&mut self, key: &str, value: Option<f64>) {
        // from_f64 rejects NaN and infinities.
        if let Some(number) = value.and_then(Number::from_f64) {
            self.fields
                .insert(key.to_string(), ParamValue::Number(number));
        }
    }

    fn push_list(&mut self, key: &str, values: &[String]) {
        let items: Vec<String> = values.iter().filter(|v| !v.is_empty()).cloned().collect();
        if !items.is_empty() {
            self.fields.insert(key.to_string(), ParamValue::List(items));
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.fields.insert(key.into(), value)
    }

    /// Inserts only when the key is not already present.
    pub fn insert_default(&mut self, key: &str, value: ParamValue) {
        self.fields.entry(key.to_string()).or_insert(value);
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.fields.remove(key)
    }

    /// Moves a value to a new key; the old key is gone afterwards.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.fields.remove(from) {
            Some(value) => {
                self.fields.insert(to.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flat_map(|(key, value)| {
                value
                    .query_values()
                    .into_iter()
                    .map(move |v| (key.clone(), v))
            })
            .collect()
    }

    pub fn to_json(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| {
                let json = match value {
                    ParamValue::Text(s) => Value::String(s.clone()),
                    ParamValue::Number(n) => Value::Number(n.clone()),
                    ParamValue::List(items) => {
                        Value::Array(items.iter().cloned().map(Value::String).collect())
                    }
                };
                (key.clone(), json)
            })
            .collect();
        Value::Object(map)
    }
}
