use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::crud::RecipeError;

// =============================================================================
// RECIPE WIZARD
// =============================================================================
//
// The four-step collection flow. Everything gathered here stays in process
// memory until the confirm step; the database is only touched when the whole
// draft validates. Drafts are keyed by an opaque id and owned by the user who
// started them.

/// Step-2 metadata, accumulated as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftDetails {
    pub name: String,
    pub description: Option<String>,
    pub preparation_time: i64,
    pub calories: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub id: Uuid,
    pub user_id: i64,
    /// Present in edit mode.
    pub recipe_id: Option<i64>,
    /// Step 1: ingredient selection, deduplicated and sorted.
    pub selection: Option<Vec<i64>>,
    /// Step 2.
    pub details: Option<DraftDetails>,
    /// Step 3.
    pub preparing: Option<String>,
    /// Step 4 (prefilled from storage in edit mode). Keys always mirror the
    /// selection; synthesized entries hold an empty quantity until filled in.
    pub quantities: Option<BTreeMap<i64, String>>,
    pub created_at: DateTime<Utc>,
}

impl RecipeDraft {
    pub fn new(user_id: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            recipe_id: None,
            selection: None,
            details: None,
            preparing: None,
            quantities: None,
            created_at: Utc::now(),
        }
    }

    /// Apply the step-1 selection. Quantities already entered are reconciled
    /// against the new set: kept ingredients retain their value, new ones get
    /// an empty value to be filled at step 4, deselected ones are dropped.
    pub fn set_selection(&mut self, ingredient_ids: Vec<i64>) {
        let selection = normalize_ids(&ingredient_ids);

        if let Some(existing) = self.quantities.take() {
            let mut next = BTreeMap::new();
            for id in &selection {
                next.insert(*id, existing.get(id).cloned().unwrap_or_default());
            }
            self.quantities = Some(next);
        }

        self.selection = Some(selection);
    }

    pub fn set_quantities(&mut self, rows: BTreeMap<i64, String>) -> Result<(), RecipeError> {
        let selection: HashSet<i64> = self
            .selection
            .as_deref()
            .unwrap_or_default()
            .iter()
            .copied()
            .collect();
        let submitted: HashSet<i64> = rows.keys().copied().collect();

        // Exactly one row per selected ingredient, nothing else.
        if selection != submitted {
            return Err(RecipeError::QuantityMismatch);
        }

        if rows.values().any(|q| q.trim().is_empty()) {
            return Err(RecipeError::QuantityMissing);
        }

        self.quantities = Some(rows);
        Ok(())
    }

    /// All four steps done, with quantities matching the selection and none
    /// left empty (a step-1 edit may have synthesized blank rows).
    pub fn validate_complete(&self) -> Result<(), RecipeError> {
        let selection = self.selection.as_ref().ok_or(RecipeError::StepIncomplete(1))?;
        self.details.as_ref().ok_or(RecipeError::StepIncomplete(2))?;
        self.preparing.as_ref().ok_or(RecipeError::StepIncomplete(3))?;
        let quantities = self.quantities.as_ref().ok_or(RecipeError::StepIncomplete(4))?;

        let selected: HashSet<i64> = selection.iter().copied().collect();
        let entered: HashSet<i64> = quantities.keys().copied().collect();
        if selected != entered {
            return Err(RecipeError::QuantityMismatch);
        }
        if quantities.values().any(|q| q.trim().is_empty()) {
            return Err(RecipeError::StepIncomplete(4));
        }

        Ok(())
    }
}

fn normalize_ids(ids: &[i64]) -> Vec<i64> {
    let mut out: Vec<i64> = ids.iter().copied().collect::<HashSet<_>>().into_iter().collect();
    out.sort_unstable();
    out
}

// =============================================================================
// RECONCILIATION
// =============================================================================

/// A persisted ingredient-quantity row, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientRowRef {
    pub ingredient_id: i64,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilePlan {
    /// Rows kept in place; their quantity may still be edited.
    pub keep: Vec<IngredientRowRef>,
    /// Ingredients needing a fresh row.
    pub create: Vec<i64>,
    /// Ingredients whose row goes away.
    pub delete: Vec<i64>,
}

/// Pure set-difference over the old and new ingredient selections. Every id
/// in `new_ids` ends up in exactly one of `keep`/`create`; every id dropped
/// from `old_ids` ends up in `delete`. Outputs are sorted, so the plan is
/// deterministic regardless of input order.
pub fn reconcile(old_ids: &[i64], new_ids: &[i64], existing_rows: &[IngredientRowRef]) -> ReconcilePlan {
    let old: HashSet<i64> = old_ids.iter().copied().collect();
    let new: HashSet<i64> = new_ids.iter().copied().collect();

    let by_id: HashMap<i64, &IngredientRowRef> = existing_rows
        .iter()
        .map(|row| (row.ingredient_id, row))
        .collect();

    let mut keep: Vec<IngredientRowRef> = old
        .intersection(&new)
        .map(|id| {
            by_id.get(id).map(|row| (*row).clone()).unwrap_or(IngredientRowRef {
                ingredient_id: *id,
                quantity: String::new(),
            })
        })
        .collect();
    keep.sort_by_key(|row| row.ingredient_id);

    let mut create: Vec<i64> = new.difference(&old).copied().collect();
    create.sort_unstable();

    let mut delete: Vec<i64> = old.difference(&new).copied().collect();
    delete.sort_unstable();

    ReconcilePlan { keep, create, delete }
}

// =============================================================================
// DRAFT STORE
// =============================================================================

// Drafts older than this are swept whenever a new wizard starts. No timer:
// the service runs no background tasks.
const DRAFT_TTL_HOURS: i64 = 24;

#[derive(Default)]
pub struct WizardStore {
    drafts: RwLock<HashMap<Uuid, RecipeDraft>>,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self, draft: RecipeDraft) -> Uuid {
        let id = draft.id;
        let mut drafts = self.drafts.write().await;

        let cutoff = Utc::now() - Duration::hours(DRAFT_TTL_HOURS);
        drafts.retain(|_, d| d.created_at > cutoff);

        drafts.insert(id, draft);
        id
    }

    /// Fetch a clone of the draft; only the owner may see it.
    pub async fn fetch(&self, id: Uuid, user_id: i64) -> Result<RecipeDraft, RecipeError> {
        let drafts = self.drafts.read().await;
        let draft = drafts.get(&id).ok_or(RecipeError::DraftNotFound)?;

        if draft.user_id != user_id {
            return Err(RecipeError::DraftNotFound);
        }

        Ok(draft.clone())
    }

    pub async fn store(&self, draft: RecipeDraft) {
        self.drafts.write().await.insert(draft.id, draft);
    }

    pub async fn discard(&self, id: Uuid, user_id: i64) -> Result<(), RecipeError> {
        let mut drafts = self.drafts.write().await;

        match drafts.get(&id) {
            Some(draft) if draft.user_id == user_id => {
                drafts.remove(&id);
                Ok(())
            }
            _ => Err(RecipeError::DraftNotFound),
        }
    }
}
