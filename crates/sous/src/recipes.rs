//! The recipe system: pantry and recipe tools over a SQLite store.

pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::{Tool, ToolCall};
use crate::systems::System;
use self::store::RecipeStore;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A stored recipe in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<i64>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

/// One pantry entry, keyed case-insensitively by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

#[derive(Deserialize)]
struct UpsertItemParams {
    item: PantryItem,
}

#[derive(Deserialize)]
struct UpsertItemsParams {
    items: Vec<PantryItem>,
}

#[derive(Deserialize)]
struct RemoveItemParams {
    item_name: String,
}

#[derive(Deserialize)]
struct UpsertRecipeParams {
    recipe: Recipe,
}

#[derive(Deserialize)]
struct GetRecipeParams {
    recipe_id: String,
}

#[derive(Deserialize)]
struct SearchRecipesParams {
    #[serde(default)]
    query: String,
    #[serde(default)]
    tag: Option<String>,
}

/// System exposing the pantry and recipe operations to the agent.
pub struct RecipeSystem {
    tools: Vec<Tool>,
    store: Arc<RecipeStore>,
}

impl RecipeSystem {
    pub fn new(store: Arc<RecipeStore>) -> Self {
        Self {
            tools: catalog(),
            store,
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(arguments: Value) -> ToolResult<T> {
        serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))
    }

    fn store_err(e: anyhow::Error) -> ToolError {
        ToolError::ExecutionError(e.to_string())
    }
}

#[async_trait]
impl System for RecipeSystem {
    fn name(&self) -> &str {
        "recipes"
    }

    fn description(&self) -> &str {
        "Pantry inventory and a local recipe store"
    }

    fn instructions(&self) -> &str {
        "Use the pantry tools to list, add, update, or remove pantry items, \
         and the recipe tools to search, fetch, or save recipes. Search the \
         local store first; chain multiple tools in sequence when a request \
         needs it. When listing pantry items, report only what the list \
         tool returned."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Value> {
        match tool_call.name.as_str() {
            "pantry_list_items" => {
                let items = self.store.list_pantry().map_err(Self::store_err)?;
                Ok(json!(items))
            }
            "pantry_upsert_item" => {
                let params: UpsertItemParams = Self::parse(tool_call.arguments)?;
                self.store
                    .upsert_pantry_item(&params.item)
                    .map_err(Self::store_err)?;
                Ok(json!("ok"))
            }
            "pantry_upsert_items" => {
                let params: UpsertItemsParams = Self::parse(tool_call.arguments)?;
                for item in &params.items {
                    self.store.upsert_pantry_item(item).map_err(Self::store_err)?;
                }
                Ok(json!("ok"))
            }
            "pantry_remove_item" => {
                let params: RemoveItemParams = Self::parse(tool_call.arguments)?;
                let deleted = self
                    .store
                    .remove_pantry_item(&params.item_name)
                    .map_err(Self::store_err)?;
                Ok(json!(if deleted { "removed" } else { "not found" }))
            }
            "recipes_upsert" => {
                let params: UpsertRecipeParams = Self::parse(tool_call.arguments)?;
                let rid = self
                    .store
                    .upsert_recipe(&params.recipe)
                    .map_err(Self::store_err)?;
                Ok(json!(rid))
            }
            "recipes_get" => {
                let params: GetRecipeParams = Self::parse(tool_call.arguments)?;
                let recipe = self
                    .store
                    .get_recipe(&params.recipe_id)
                    .map_err(Self::store_err)?;
                Ok(json!(recipe))
            }
            "recipes_search" => {
                let params: SearchRecipesParams = Self::parse(tool_call.arguments)?;
                let ids = self
                    .store
                    .search_recipes(&params.query, params.tag.as_deref())
                    .map_err(Self::store_err)?;
                Ok(json!(ids))
            }
            other => Err(ToolError::ToolNotFound(other.to_string())),
        }
    }
}

fn pantry_item_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string", "description": "Ingredient name, e.g. 'chickpeas'"},
            "qty": {"type": "number", "description": "Numeric quantity, e.g. 2"},
            "unit": {"type": "string", "description": "e.g. 'cans', 'g', 'ml'"},
            "expires": {"type": "string", "description": "ISO date string, e.g. '2026-02-28'"}
        }
    })
}

fn recipe_schema() -> Value {
    json!({
        "type": "object",
        "required": ["title"],
        "properties": {
            "id": {"type": "string", "description": "Recipe id; derived from the title when omitted"},
            "title": {"type": "string"},
            "servings": {"type": "integer"},
            "ingredients": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string"},
                        "qty": {"type": "number"},
                        "unit": {"type": "string"},
                        "note": {"type": "string"}
                    }
                }
            },
            "steps": {"type": "array", "items": {"type": "string"}},
            "tags": {"type": "array", "items": {"type": "string"}},
            "source_url": {"type": "string"},
            "source_site": {"type": "string"},
            "fetched_at": {"type": "string"}
        }
    })
}

fn catalog() -> Vec<Tool> {
    vec![
        Tool::new(
            "pantry_list_items",
            "List all pantry items currently stored in the user's pantry. \
             Call this whenever the user asks what they have, and before \
             selecting recipes or building a shopping list. Read-only; \
             returns an empty list for an empty pantry.",
            json!({"type": "object", "properties": {}}),
        ),
        Tool::new(
            "pantry_upsert_item",
            "Add a new pantry item or update an existing one by name. Use \
             when the user adds an ingredient, changes a quantity or unit, \
             or records an expiry date. Overwrites the stored record for \
             that item name.",
            json!({
                "type": "object",
                "required": ["item"],
                "properties": {
                    "item": pantry_item_schema()
                }
            }),
        ),
        Tool::new(
            "pantry_upsert_items",
            "Add or update multiple pantry items in one go. Prefer this \
             over repeated pantry_upsert_item calls when the user adds \
             several ingredients at once. An empty list is a no-op.",
            json!({
                "type": "object",
                "required": ["items"],
                "properties": {
                    "items": {"type": "array", "items": pantry_item_schema()}
                }
            }),
        ),
        Tool::new(
            "pantry_remove_item",
            "Remove a pantry item by name (case-insensitive). Removes the \
             entire entry; to reduce a quantity use pantry_upsert_item with \
             the new quantity instead. Returns 'removed' or 'not found'.",
            json!({
                "type": "object",
                "required": ["item_name"],
                "properties": {
                    "item_name": {"type": "string"}
                }
            }),
        ),
        Tool::new(
            "recipes_upsert",
            "Insert a new recipe or update an existing one in the local \
             recipe store. Returns the recipe_id of the stored recipe. \
             Include source_url when the recipe came from an external page.",
            json!({
                "type": "object",
                "required": ["recipe"],
                "properties": {
                    "recipe": recipe_schema()
                }
            }),
        ),
        Tool::new(
            "recipes_get",
            "Fetch a single recipe by its recipe_id, as returned by \
             recipes_search or recipes_upsert. Returns null when no recipe \
             exists with that id.",
            json!({
                "type": "object",
                "required": ["recipe_id"],
                "properties": {
                    "recipe_id": {"type": "string"}
                }
            }),
        ),
        Tool::new(
            "recipes_search",
            "Search the local recipe store and return matching recipe ids. \
             The query is matched against recipe titles and ingredient \
             names; an empty query matches all recipes. The optional tag \
             filter keeps only recipes carrying that exact tag.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "tag": {"type": "string"}
                }
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn system() -> (RecipeSystem, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = RecipeStore::open(&dir.path().join("recipes.db")).unwrap();
        (RecipeSystem::new(Arc::new(store)), dir)
    }

    #[tokio::test]
    async fn test_pantry_round_trip() {
        let (system, _dir) = system();

        let result = system
            .call(ToolCall::new(
                "pantry_upsert_items",
                json!({"items": [
                    {"name": "Chickpeas", "qty": 2.0, "unit": "cans"},
                    {"name": "pasta", "qty": 500.0, "unit": "g"}
                ]}),
            ))
            .await
            .unwrap();
        assert_eq!(result, json!("ok"));

        let listed = system
            .call(ToolCall::new("pantry_list_items", json!({})))
            .await
            .unwrap();
        let items: Vec<PantryItem> = serde_json::from_value(listed).unwrap();
        assert_eq!(items.len(), 2);

        let removed = system
            .call(ToolCall::new(
                "pantry_remove_item",
                json!({"item_name": "CHICKPEAS"}),
            ))
            .await
            .unwrap();
        assert_eq!(removed, json!("removed"));

        let removed = system
            .call(ToolCall::new(
                "pantry_remove_item",
                json!({"item_name": "chickpeas"}),
            ))
            .await
            .unwrap();
        assert_eq!(removed, json!("not found"));
    }

    #[tokio::test]
    async fn test_recipe_round_trip() {
        let (system, _dir) = system();

        let rid = system
            .call(ToolCall::new(
                "recipes_upsert",
                json!({"recipe": {
                    "title": "Lentil Soup",
                    "ingredients": [{"name": "red lentils", "qty": 200.0, "unit": "g"}],
                    "steps": ["Simmer the lentils."],
                    "tags": ["vegetarian"]
                }}),
            ))
            .await
            .unwrap();
        assert_eq!(rid, json!("lentil-soup"));

        let fetched = system
            .call(ToolCall::new(
                "recipes_get",
                json!({"recipe_id": "lentil-soup"}),
            ))
            .await
            .unwrap();
        let recipe: Recipe = serde_json::from_value(fetched).unwrap();
        assert_eq!(recipe.title, "Lentil Soup");

        let found = system
            .call(ToolCall::new(
                "recipes_search",
                json!({"query": "lentil", "tag": "vegetarian"}),
            ))
            .await
            .unwrap();
        assert_eq!(found, json!(["lentil-soup"]));
    }

    #[tokio::test]
    async fn test_recipes_get_missing_returns_null() {
        let (system, _dir) = system();
        let fetched = system
            .call(ToolCall::new("recipes_get", json!({"recipe_id": "nope"})))
            .await
            .unwrap();
        assert_eq!(fetched, Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (system, _dir) = system();
        let err = system
            .call(ToolCall::new("pantry_defrost", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let (system, _dir) = system();
        let err = system
            .call(ToolCall::new("pantry_remove_item", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let tools = catalog();
        let mut names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tools.len());
    }
}
