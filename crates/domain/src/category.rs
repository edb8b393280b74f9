//! Category entity.

use common::CategoryDto;

use crate::error::ValidationError;
use crate::value_objects::{CategoryId, CategoryName};

/// A product category. Identity is the id; two categories are equal when
/// their ids are equal, whatever their names.
#[derive(Debug, Clone)]
pub struct Category {
    id: CategoryId,
    name: CategoryName,
}

impl Category {
    /// Creates a new category with a fresh id.
    pub fn new(name: CategoryName) -> Self {
        Self {
            id: CategoryId::generate(),
            name,
        }
    }

    /// Rebuilds a category with an existing id (storage or transport).
    pub fn build(id: CategoryId, name: CategoryName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    pub fn change_name(&mut self, name: CategoryName) {
        self.name = name;
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl std::hash::Hash for Category {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        CategoryDto {
            id: category.id.value(),
            name: category.name.value().to_string(),
        }
    }
}

impl TryFrom<&CategoryDto> for Category {
    type Error = ValidationError;

    fn try_from(dto: &CategoryDto) -> Result<Self, Self::Error> {
        Ok(Category::build(
            CategoryId::parse(&dto.id)?,
            CategoryName::new(dto.name.as_str())?,
        ))
    }
}
