use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::Utc;

use crate::error::AppError;
use crate::models::{
    Category, CategoryInput, ListParams, Pagination, Priority, Todo, TodoInput, TodoPage,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// In-memory tables. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct Db {
    todos: BTreeMap<u64, Todo>,
    categories: BTreeMap<u64, Category>,
    last_todo_id: u64,
    last_category_id: u64,
}

impl Db {
    // -- todos --

    pub fn list_todos(&self, params: &ListParams) -> TodoPage {
        let page = params
            .page
            .as_deref()
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(1);
        let limit = params
            .limit
            .as_deref()
            .and_then(|l| l.parse::<u32>().ok())
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);

        let search = params
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let completed = params.completed.as_deref().and_then(parse_bool);
        let category_id = params
            .category_id
            .as_deref()
            .and_then(|c| c.parse::<u64>().ok());
        let priority = params.priority.as_deref().and_then(Priority::parse);

        let mut matches: Vec<&Todo> = self
            .todos
            .values()
            .filter(|t| {
                search.as_deref().map_or(true, |s| {
                    t.title.to_lowercase().contains(s) || t.description.to_lowercase().contains(s)
                })
            })
            .filter(|t| completed.map_or(true, |c| t.completed == c))
            .filter(|t| category_id.map_or(true, |c| t.category_id == Some(c)))
            .filter(|t| priority.map_or(true, |p| t.priority == p))
            .collect();

        let descending = !matches!(params.sort_order.as_deref(), Some("asc"));
        let sort_by = params.sort_by.as_deref().unwrap_or("created_at");
        matches.sort_by(|a, b| {
            let ord = compare(a, b, sort_by).then(a.id.cmp(&b.id));
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let total = matches.len() as u64;
        let offset = (page as usize - 1) * limit as usize;
        let data = matches
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|t| self.embed(t.clone()))
            .collect();

        TodoPage {
            data,
            pagination: Pagination {
                current_page: page,
                per_page: limit,
                total,
                total_pages: total.div_ceil(limit as u64) as u32,
            },
        }
    }

    pub fn get_todo(&self, id: u64) -> Result<Todo, AppError> {
        self.todos
            .get(&id)
            .cloned()
            .map(|t| self.embed(t))
            .ok_or(AppError::NotFound("todo"))
    }

    pub fn create_todo(&mut self, input: TodoInput) -> Result<Todo, AppError> {
        input.validate()?;
        self.check_category(input.category_id)?;
        self.last_todo_id += 1;
        let now = Utc::now();
        let todo = Todo {
            id: self.last_todo_id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            priority: input.priority,
            category_id: input.category_id,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            category: None,
        };
        self.todos.insert(todo.id, todo.clone());
        Ok(self.embed(todo))
    }

    pub fn update_todo(&mut self, id: u64, input: TodoInput) -> Result<Todo, AppError> {
        if !self.todos.contains_key(&id) {
            return Err(AppError::NotFound("todo"));
        }
        input.validate()?;
        self.check_category(input.category_id)?;
        let todo = self.todos.get_mut(&id).ok_or(AppError::NotFound("todo"))?;
        todo.title = input.title;
        todo.description = input.description;
        todo.completed = input.completed;
        todo.priority = input.priority;
        todo.category_id = input.category_id;
        todo.due_date = input.due_date;
        todo.updated_at = Utc::now();
        let todo = todo.clone();
        Ok(self.embed(todo))
    }

    pub fn delete_todo(&mut self, id: u64) -> Result<(), AppError> {
        self.todos
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound("todo"))
    }

    pub fn toggle_complete(&mut self, id: u64) -> Result<Todo, AppError> {
        let todo = self.todos.get_mut(&id).ok_or(AppError::NotFound("todo"))?;
        todo.completed = !todo.completed;
        todo.updated_at = Utc::now();
        let todo = todo.clone();
        Ok(self.embed(todo))
    }

    // -- categories --

    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.values().cloned().collect()
    }

    pub fn get_category(&self, id: u64) -> Result<Category, AppError> {
        self.categories
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound("category"))
    }

    pub fn create_category(&mut self, input: CategoryInput) -> Result<Category, AppError> {
        input.validate()?;
        self.check_unique_name(&input.name, None)?;
        self.last_category_id += 1;
        let category = Category {
            id: self.last_category_id,
            name: input.name,
            color: input.color,
            created_at: Utc::now(),
        };
        self.categories.insert(category.id, category.clone());
        Ok(category)
    }

    pub fn update_category(&mut self, id: u64, input: CategoryInput) -> Result<Category, AppError> {
        if !self.categories.contains_key(&id) {
            return Err(AppError::NotFound("category"));
        }
        input.validate()?;
        self.check_unique_name(&input.name, Some(id))?;
        let category = self
            .categories
            .get_mut(&id)
            .ok_or(AppError::NotFound("category"))?;
        category.name = input.name;
        category.color = input.color;
        Ok(category.clone())
    }

    /// Todos that pointed at the category keep existing, uncategorized.
    pub fn delete_category(&mut self, id: u64) -> Result<(), AppError> {
        self.categories
            .remove(&id)
            .ok_or(AppError::NotFound("category"))?;
        for todo in self.todos.values_mut() {
            if todo.category_id == Some(id) {
                todo.category_id = None;
            }
        }
        Ok(())
    }

    fn embed(&self, mut todo: Todo) -> Todo {
        todo.category = todo
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());
        todo
    }

    fn check_category(&self, category_id: Option<u64>) -> Result<(), AppError> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(AppError::Validation(
                [("category_id", format!("category {id} does not exist"))].into(),
            )),
            _ => Ok(()),
        }
    }

    fn check_unique_name(&self, name: &str, except: Option<u64>) -> Result<(), AppError> {
        let taken = self
            .categories
            .values()
            .any(|c| Some(c.id) != except && c.name.eq_ignore_ascii_case(name.trim()));
        if taken {
            Err(AppError::Conflict(format!("category '{name}' already exists")))
        } else {
            Ok(())
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "1" | "t" | "T" | "TRUE" | "True" => Some(true),
        "false" | "0" | "f" | "F" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn compare(a: &Todo, b: &Todo, sort_by: &str) -> Ordering {
    match sort_by {
        "title" => a.title.cmp(&b.title),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        // Undated todos sort after dated ones in ascending order.
        "due_date" => match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        "priority" => a.priority.rank().cmp(&b.priority.rank()),
        _ => a.created_at.cmp(&b.created_at),
    }
}
