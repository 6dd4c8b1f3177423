use crate::model::RecipeRecord;

/// Complexity bands scored from ingredient and instruction-step
/// counts:
///
/// | band     | ingredients | steps |
/// |----------|-------------|-------|
/// | easy     | 3..=6       | 3..=5 |
/// | moderate | 6..=10      | 6..=8 |
/// | complex  | >=10        | >=8   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Easy,
    Moderate,
    Complex,
}

impl Band {
    pub fn parse(s: &str) -> Option<Band> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Band::Easy),
            "moderate" => Some(Band::Moderate),
            "complex" => Some(Band::Complex),
            _ => None,
        }
    }
}

/// Whether a recipe meets the requested band. Empty or unrecognized
/// band names are permissive, and malformed recipes count as zero
/// rather than failing; this runs both as a catalog filter and as a
/// validator over model-generated items.
pub fn meets_band(recipe: &RecipeRecord, requested: &str) -> bool {
    if requested.is_empty() {
        return true;
    }
    let Some(band) = Band::parse(requested) else {
        return true;
    };

    let ingredients = recipe.ingredients.len();
    let steps = step_count(&recipe.instructions);

    match band {
        Band::Easy => (3..=6).contains(&ingredients) && (3..=5).contains(&steps),
        Band::Moderate => (6..=10).contains(&ingredients) && (6..=8).contains(&steps),
        Band::Complex => ingredients >= 10 && steps >= 8,
    }
}

/// Count instruction steps: newlines become sentence boundaries,
/// fragments are split on periods, and only trimmed fragments longer
/// than 5 characters survive.
pub fn step_count(instructions: &str) -> usize {
    instructions
        .replace('\n', ".")
        .split('.')
        .map(str::trim)
        .filter(|step| step.len() > 5)
        .count()
}
