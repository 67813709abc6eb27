//! Editable recipe state for create and update calls.
//!
//! Ingredient and instruction rows are repeating groups: rows can be added,
//! removed and reordered freely, and blank rows are tolerated until the draft
//! is turned into a request body. Instruction steps are always numbered
//! `1..=n` in their current order.

use serde::Serialize;
use serde_json::Value;
use shared::{CategoryId, Difficulty, Ingredient, InstructionStep, Recipe};
use std::fmt;

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftIssue {
    pub field: &'static str,
    pub message: String,
}

impl DraftIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for DraftIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub servings: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub cuisine_type: Option<String>,
    pub cooking_method: Option<String>,
    pub categories: Vec<CategoryId>,
    pub dietary_restrictions: Vec<String>,
    ingredients: Vec<Ingredient>,
    instructions: Vec<InstructionStep>,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct DraftPayload<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prep_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cook_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    difficulty: Option<&'a Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cuisine_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cooking_method: Option<&'a str>,
    categories: &'a [CategoryId],
    dietary_restrictions: &'a [String],
    tags: &'a [String],
    ingredients: Vec<Ingredient>,
    instructions: Vec<InstructionStep>,
}

impl RecipeDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn from_recipe(recipe: &Recipe) -> Self {
        let summary = &recipe.summary;
        let mut draft = Self {
            title: summary.title.clone(),
            description: summary.description.clone().unwrap_or_default(),
            prep_time: summary.prep_time,
            cook_time: summary.cook_time,
            servings: summary.servings,
            difficulty: summary.difficulty.clone(),
            cuisine_type: summary.cuisine_type.clone(),
            cooking_method: summary.cooking_method.clone(),
            categories: recipe.categories.iter().map(|c| c.id).collect(),
            dietary_restrictions: recipe.dietary_restrictions.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: Vec::new(),
            tags: Vec::new(),
        };

        let mut steps = recipe.instructions.clone();
        steps.sort_by_key(|step| step.step_number);
        draft.instructions = steps;
        draft.renumber();

        for tag in &summary.tags {
            draft.add_tag(tag);
        }
        draft
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn instructions(&self) -> &[InstructionStep] {
        &self.instructions
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn add_ingredient(&mut self, ingredient: Ingredient) -> usize {
        self.ingredients.push(ingredient);
        self.ingredients.len() - 1
    }

    pub fn remove_ingredient(&mut self, index: usize) -> Option<Ingredient> {
        (index < self.ingredients.len()).then(|| self.ingredients.remove(index))
    }

    pub fn move_ingredient(&mut self, from: usize, to: usize) -> bool {
        move_row(&mut self.ingredients, from, to)
    }

    /// Appends a step and returns its step number.
    pub fn add_step(&mut self, instruction: impl Into<String>) -> u32 {
        self.instructions.push(InstructionStep {
            step_number: 0,
            instruction: instruction.into(),
            duration_minutes: None,
        });
        self.renumber();
        self.instructions.len() as u32
    }

    pub fn remove_step(&mut self, index: usize) -> Option<InstructionStep> {
        if index >= self.instructions.len() {
            return None;
        }
        let removed = self.instructions.remove(index);
        self.renumber();
        Some(removed)
    }

    pub fn move_step(&mut self, from: usize, to: usize) -> bool {
        let moved = move_row(&mut self.instructions, from, to);
        if moved {
            self.renumber();
        }
        moved
    }

    pub fn set_step_duration(&mut self, index: usize, minutes: Option<u32>) -> bool {
        match self.instructions.get_mut(index) {
            Some(step) => {
                step.duration_minutes = minutes;
                true
            }
            None => false,
        }
    }

    /// Adds a trimmed tag unless it is blank or already present (ignoring case).
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let lowered = tag.trim().to_lowercase();
        let before = self.tags.len();
        self.tags.retain(|existing| existing.to_lowercase() != lowered);
        self.tags.len() != before
    }

    fn has_tag(&self, tag: &str) -> bool {
        let lowered = tag.to_lowercase();
        self.tags.iter().any(|existing| existing.to_lowercase() == lowered)
    }

    fn renumber(&mut self) {
        for (index, step) in self.instructions.iter_mut().enumerate() {
            step.step_number = index as u32 + 1;
        }
    }

    /// Every problem with the draft, in field order. Empty means valid.
    pub fn validate(&self) -> Vec<DraftIssue> {
        let mut issues = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            issues.push(DraftIssue::new("title", "Title is required"));
        } else if title.chars().count() > MAX_TITLE_LEN {
            issues.push(DraftIssue::new(
                "title",
                format!("Title must be at most {} characters", MAX_TITLE_LEN),
            ));
        }

        if self.servings == Some(0) {
            issues.push(DraftIssue::new("servings", "Servings must be at least 1"));
        }

        if !self
            .ingredients
            .iter()
            .any(|ingredient| !ingredient.name.trim().is_empty())
        {
            issues.push(DraftIssue::new(
                "ingredients",
                "At least one ingredient is required",
            ));
        }

        if !self
            .instructions
            .iter()
            .any(|step| !step.instruction.trim().is_empty())
        {
            issues.push(DraftIssue::new(
                "instructions",
                "At least one instruction step is required",
            ));
        }

        issues
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Request body for create/update. Blank rows are skipped and steps renumbered.
    pub fn to_payload(&self) -> Value {
        let ingredients = self
            .ingredients
            .iter()
            .filter(|ingredient| !ingredient.name.trim().is_empty())
            .map(|ingredient| Ingredient {
                name: ingredient.name.trim().to_string(),
                quantity: non_blank(ingredient.quantity.as_deref()),
                unit: non_blank(ingredient.unit.as_deref()),
                notes: non_blank(ingredient.notes.as_deref()),
                is_optional: ingredient.is_optional,
            })
            .collect();

        let instructions = self
            .instructions
            .iter()
            .filter(|step| !step.instruction.trim().is_empty())
            .enumerate()
            .map(|(index, step)| InstructionStep {
                step_number: index as u32 + 1,
                instruction: step.instruction.trim().to_string(),
                duration_minutes: step.duration_minutes,
            })
            .collect();

        let payload = DraftPayload {
            title: self.title.trim(),
            description: self.description.trim(),
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            difficulty: self.difficulty.as_ref(),
            cuisine_type: self.cuisine_type.as_deref().filter(|s| !s.trim().is_empty()),
            cooking_method: self.cooking_method.as_deref().filter(|s| !s.trim().is_empty()),
            categories: &self.categories,
            dietary_restrictions: &self.dietary_restrictions,
            tags: &self.tags,
            ingredients,
            instructions,
        };

        serde_json::to_value(payload).unwrap_or(Value::Null)
    }
}

fn move_row<T>(rows: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= rows.len() || to >= rows.len() {
        return false;
    }
    if from != to {
        let row = rows.remove(from);
        rows.insert(to, row);
    }
    true
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
