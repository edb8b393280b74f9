//! Catalog commands.
//!
//! Commands carry raw caller input. Validation into value objects happens in
//! the services before any transaction is opened.

use common::{
    CategoryDto, CreateCategoryRequest, CreateProductRequest, UpdateCategoryRequest,
    UpdateProductRequest,
};

/// Command to add a category.
#[derive(Debug, Clone)]
pub struct AddCategory {
    pub name: String,
}

impl AddCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<CreateCategoryRequest> for AddCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        Self::new(req.name)
    }
}

/// Command to rename an existing category.
#[derive(Debug, Clone)]
pub struct UpdateCategory {
    pub id: String,
    pub name: String,
}

impl UpdateCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<UpdateCategoryRequest> for UpdateCategory {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self::new(req.id, req.name)
    }
}

/// Command to delete a category.
#[derive(Debug, Clone)]
pub struct DeleteCategory {
    pub id: String,
}

impl DeleteCategory {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Command to add a product.
#[derive(Debug, Clone)]
pub struct AddProduct {
    pub name: String,
    pub price: u32,

    /// Category the product belongs to. The whole DTO must be valid; the
    /// stored category is looked up by id.
    pub category: CategoryDto,
}

impl AddProduct {
    pub fn new(name: impl Into<String>, price: u32, category: CategoryDto) -> Self {
        Self {
            name: name.into(),
            price,
            category,
        }
    }
}

impl From<CreateProductRequest> for AddProduct {
    fn from(req: CreateProductRequest) -> Self {
        Self::new(req.name, req.price, req.category)
    }
}

/// Command to replace all mutable fields of a product.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub category: CategoryDto,
}

impl UpdateProduct {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: u32,
        category: CategoryDto,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category,
        }
    }
}

impl From<UpdateProductRequest> for UpdateProduct {
    fn from(req: UpdateProductRequest) -> Self {
        Self::new(req.id, req.name, req.price, req.category)
    }
}

/// Command to delete a product.
#[derive(Debug, Clone)]
pub struct DeleteProduct {
    pub id: String,
}

impl DeleteProduct {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
