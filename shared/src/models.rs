use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

pub type RecipeId = u64;
pub type CategoryId = u64;

/// Page envelope returned by every paginated endpoint.
///
/// `next` is `None` only on the last page and `previous` is `None` only on the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.previous.is_none()
    }

    pub fn is_last_page(&self) -> bool {
        self.next.is_none()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[serde(other)]
    Unknown,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeListItem {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<UserSummary>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub prep_time: Option<u32>,
    #[serde(default)]
    pub cook_time: Option<u32>,
    #[serde(default)]
    pub total_time: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub cooking_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub category_names: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub step_number: u32,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(flatten)]
    pub summary: RecipeListItem,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<InstructionStep>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub nutrition: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    #[serde(default)]
    pub recipe_count: Option<u32>,
    #[serde(default)]
    pub children: Vec<Category>,
}

impl Category {
    pub fn new(id: CategoryId, name: &str, slug: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            parent: None,
            recipe_count: None,
            children: Vec::new(),
        }
    }

    /// Depth-first walk over a category forest, parents before children.
    pub fn flatten(categories: &[Category]) -> Vec<&Category> {
        let mut out = Vec::new();
        let mut stack: Vec<&Category> = categories.iter().rev().collect();
        while let Some(category) = stack.pop() {
            out.push(category);
            stack.extend(category.children.iter().rev());
        }
        out
    }

    pub fn find_by_slug<'a>(categories: &'a [Category], slug: &str) -> Option<&'a Category> {
        Self::flatten(categories)
            .into_iter()
            .find(|category| category.slug == slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: u64,
    pub recipe: RecipeId,
    #[serde(default)]
    pub user: Option<UserSummary>,
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRating {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

/// Outcome of a favorite toggle. The backend names the field `is_favorite`;
/// `is_favorited` is read too, and the backend name wins when both are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FavoriteStatus {
    pub is_favorited: bool,
}

impl<'de> Deserialize<'de> for FavoriteStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawStatus {
            #[serde(default)]
            is_favorite: Option<bool>,
            #[serde(default)]
            is_favorited: Option<bool>,
        }

        let raw = RawStatus::deserialize(deserializer)?;
        raw.is_favorite
            .or(raw.is_favorited)
            .map(|is_favorited| FavoriteStatus { is_favorited })
            .ok_or_else(|| serde::de::Error::missing_field("is_favorite"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSuggestion {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, JsonValue>>,
}

impl<'de> Deserialize<'de> for SearchSuggestion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawSuggestion {
            Text(String),
            Detailed {
                text: String,
                #[serde(flatten)]
                metadata: serde_json::Map<String, JsonValue>,
            },
        }

        Ok(match RawSuggestion::deserialize(deserializer)? {
            RawSuggestion::Text(text) => SearchSuggestion {
                text,
                metadata: None,
            },
            RawSuggestion::Detailed { text, metadata } => SearchSuggestion {
                text,
                metadata: (!metadata.is_empty()).then_some(metadata),
            },
        })
    }
}

/// Decimal columns arrive either as JSON numbers or as strings like `"4.50"`.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}
