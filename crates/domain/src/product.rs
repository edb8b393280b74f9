//! Product entity.

use common::{CategoryDto, ProductDto};

use crate::category::Category;
use crate::error::ValidationError;
use crate::value_objects::{ProductId, ProductName, ProductPrice};

/// A product together with the full category it belongs to.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    name: ProductName,
    price: ProductPrice,
    category: Category,
}

impl Product {
    /// Creates a new product with a fresh id.
    pub fn new(name: ProductName, price: ProductPrice, category: Category) -> Self {
        Self {
            id: ProductId::generate(),
            name,
            price,
            category,
        }
    }

    /// Rebuilds a product with an existing id (storage or transport).
    pub fn build(id: ProductId, name: ProductName, price: ProductPrice, category: Category) -> Self {
        Self {
            id,
            name,
            price,
            category,
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn price(&self) -> ProductPrice {
        self.price
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn change_name(&mut self, name: ProductName) {
        self.name = name;
    }

    pub fn change_price(&mut self, price: ProductPrice) {
        self.price = price;
    }

    pub fn change_category(&mut self, category: Category) {
        self.category = category;
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl std::hash::Hash for Product {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&Product> for ProductDto {
    fn from(product: &Product) -> Self {
        ProductDto {
            id: product.id.value(),
            name: product.name.value().to_string(),
            price: product.price.value(),
            category: CategoryDto::from(&product.category),
        }
    }
}

impl TryFrom<&ProductDto> for Product {
    type Error = ValidationError;

    fn try_from(dto: &ProductDto) -> Result<Self, Self::Error> {
        Ok(Product::build(
            ProductId::parse(&dto.id)?,
            ProductName::new(dto.name.as_str())?,
            ProductPrice::new(dto.price)?,
            Category::try_from(&dto.category)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::CategoryName;

    fn stationery() -> Category {
        Category::new(CategoryName::new("Stationery").unwrap())
    }

    fn pen() -> Product {
        Product::new(
            ProductName::new("Pen").unwrap(),
            ProductPrice::new(100).unwrap(),
            stationery(),
        )
    }

    #[test]
    fn change_operations_replace_fields() {
        let mut product = pen();
        let id = product.id();
        let office = Category::new(CategoryName::new("Office").unwrap());

        product.change_name(ProductName::new("Fountain Pen").unwrap());
        product.change_price(ProductPrice::new(2500).unwrap());
        product.change_category(office.clone());

        assert_eq!(product.id(), id);
        assert_eq!(product.name().value(), "Fountain Pen");
        assert_eq!(product.price().value(), 2500);
        assert_eq!(product.category(), &office);
    }

    #[test]
    fn dto_carries_category() {
        let product = pen();
        let dto = ProductDto::from(&product);
        assert_eq!(dto.price, 100);
        assert_eq!(dto.category.name, "Stationery");
        assert_eq!(dto.category.id, product.category().id().value());
    }

    #[test]
    fn dto_round_trip_preserves_fields() {
        let product = pen();
        let rebuilt = Product::try_from(&ProductDto::from(&product)).unwrap();
        assert_eq!(rebuilt, product);
        assert_eq!(rebuilt.price(), product.price());
        assert_eq!(rebuilt.category().name(), product.category().name());
    }

    #[test]
    fn dto_with_invalid_price_is_rejected() {
        let mut dto = ProductDto::from(&pen());
        dto.price = 0;
        assert!(matches!(
            Product::try_from(&dto),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
