//! SQLite-backed storage for recipes and pantry items.
//!
//! Rows hold a JSON payload next to the columns used for lookup, so the
//! domain structs can evolve without schema migrations. Pantry names are
//! stored lowercased; recipe ids default to a slug of the title.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::{PantryItem, Recipe};

/// Recipe and pantry store backed by SQLite. The connection mutex
/// serializes concurrent writers from parallel orchestration runs.
pub struct RecipeStore {
    conn: Mutex<Connection>,
}

impl RecipeStore {
    /// Open or create the store at the default location
    pub fn open_default() -> Result<Self> {
        Self::open(&Self::default_path())
    }

    /// Open or create the store at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// The default database path under the user data directory
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sous")
            .join("recipes.db")
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                recipe_json TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS pantry (
                name TEXT PRIMARY KEY,
                item_json TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }

    // --- recipes ---

    /// Insert or update a recipe, returning its id. A missing id is
    /// derived from the slugged title.
    pub fn upsert_recipe(&self, recipe: &Recipe) -> Result<String> {
        let rid = recipe
            .id
            .clone()
            .unwrap_or_else(|| slugify(&recipe.title));
        let mut payload = recipe.clone();
        payload.id = Some(rid.clone());

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO recipes (id, title, recipe_json) VALUES (?1, ?2, ?3)",
            params![rid, payload.title, serde_json::to_string(&payload)?],
        )?;
        Ok(rid)
    }

    pub fn get_recipe(&self, recipe_id: &str) -> Result<Option<Recipe>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<String> = conn
            .query_row(
                "SELECT recipe_json FROM recipes WHERE id = ?1",
                params![recipe_id],
                |row| row.get(0),
            )
            .optional()?;

        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Search recipes by free text over titles and ingredient names, with
    /// an optional exact tag filter. An empty query matches all recipes.
    pub fn search_recipes(&self, query: &str, tag: Option<&str>) -> Result<Vec<String>> {
        let rows: Vec<(String, String)> = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare("SELECT id, recipe_json FROM recipes")?;
            let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            mapped.collect::<std::result::Result<_, _>>()?
        };

        let needle = query.trim().to_lowercase();
        let mut ids = Vec::new();
        for (rid, json) in rows {
            let recipe: Recipe = serde_json::from_str(&json)?;
            if !needle.is_empty() {
                let title_match = recipe.title.to_lowercase().contains(&needle);
                let ingredient_match = recipe
                    .ingredients
                    .iter()
                    .any(|i| i.name.to_lowercase().contains(&needle));
                if !title_match && !ingredient_match {
                    continue;
                }
            }
            if let Some(tag) = tag {
                if !recipe.tags.iter().any(|t| t == tag) {
                    continue;
                }
            }
            ids.push(rid);
        }
        Ok(ids)
    }

    // --- pantry ---

    pub fn list_pantry(&self) -> Result<Vec<PantryItem>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT item_json FROM pantry")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut items = Vec::new();
        for json in rows {
            items.push(serde_json::from_str(&json?)?);
        }
        Ok(items)
    }

    pub fn upsert_pantry_item(&self, item: &PantryItem) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO pantry (name, item_json) VALUES (?1, ?2)",
            params![item.name.to_lowercase(), serde_json::to_string(item)?],
        )?;
        Ok(())
    }

    /// Remove a pantry item by name. Returns true if a row was deleted.
    pub fn remove_pantry_item(&self, item_name: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM pantry WHERE name = ?1",
            params![item_name.to_lowercase()],
        )?;
        Ok(deleted > 0)
    }
}

fn slugify(title: &str) -> String {
    title.trim().to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (RecipeStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = RecipeStore::open(&dir.path().join("recipes.db")).unwrap();
        (store, dir)
    }

    fn recipe(title: &str, ingredient: &str, tags: &[&str]) -> Recipe {
        Recipe {
            id: None,
            title: title.to_string(),
            servings: Some(2),
            ingredients: vec![super::super::Ingredient {
                name: ingredient.to_string(),
                qty: None,
                unit: None,
                note: None,
            }],
            steps: vec!["Cook.".to_string()],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source_url: None,
            source_site: None,
            fetched_at: None,
        }
    }

    #[test]
    fn test_schema_created_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("recipes.db");
        let store = RecipeStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.list_pantry().unwrap().is_empty());
    }

    #[test]
    fn test_pantry_upsert_overwrites_case_insensitively() {
        let (store, _dir) = store();

        store
            .upsert_pantry_item(&PantryItem {
                name: "Milk".to_string(),
                qty: Some(1.0),
                unit: Some("l".to_string()),
                expires: None,
            })
            .unwrap();
        store
            .upsert_pantry_item(&PantryItem {
                name: "milk".to_string(),
                qty: Some(2.0),
                unit: Some("l".to_string()),
                expires: None,
            })
            .unwrap();

        let items = store.list_pantry().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].qty, Some(2.0));
    }

    #[test]
    fn test_remove_pantry_item() {
        let (store, _dir) = store();
        store
            .upsert_pantry_item(&PantryItem {
                name: "bread".to_string(),
                qty: None,
                unit: None,
                expires: None,
            })
            .unwrap();

        assert!(store.remove_pantry_item("Bread").unwrap());
        assert!(!store.remove_pantry_item("bread").unwrap());
        assert!(store.list_pantry().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_recipe_derives_slug_id() {
        let (store, _dir) = store();
        let rid = store
            .upsert_recipe(&recipe("Pasta al Pomodoro", "tomatoes", &[]))
            .unwrap();
        assert_eq!(rid, "pasta-al-pomodoro");

        let stored = store.get_recipe(&rid).unwrap().unwrap();
        assert_eq!(stored.id.as_deref(), Some("pasta-al-pomodoro"));
    }

    #[test]
    fn test_upsert_recipe_keeps_explicit_id() {
        let (store, _dir) = store();
        let mut r = recipe("Chili", "beans", &[]);
        r.id = Some("house-chili".to_string());
        assert_eq!(store.upsert_recipe(&r).unwrap(), "house-chili");
    }

    #[test]
    fn test_get_recipe_missing() {
        let (store, _dir) = store();
        assert!(store.get_recipe("nope").unwrap().is_none());
    }

    #[test]
    fn test_search_recipes() {
        let (store, _dir) = store();
        store
            .upsert_recipe(&recipe("Lentil Soup", "red lentils", &["vegetarian"]))
            .unwrap();
        store
            .upsert_recipe(&recipe("Beef Stew", "beef", &[]))
            .unwrap();

        // by title
        assert_eq!(store.search_recipes("soup", None).unwrap(), ["lentil-soup"]);
        // by ingredient
        assert_eq!(store.search_recipes("beef", None).unwrap(), ["beef-stew"]);
        // empty query matches all
        assert_eq!(store.search_recipes("", None).unwrap().len(), 2);
        // tag filter is exact
        assert_eq!(
            store.search_recipes("", Some("vegetarian")).unwrap(),
            ["lentil-soup"]
        );
        assert!(store.search_recipes("", Some("vegan")).unwrap().is_empty());
        // no match
        assert!(store.search_recipes("sushi", None).unwrap().is_empty());
    }
}
