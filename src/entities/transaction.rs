use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction of a manual stock adjustment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[sea_orm(string_value = "in")]
    In,
    #[sea_orm(string_value = "out")]
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "in",
            TransactionType::Out => "out",
        }
    }

    /// Signed change this adjustment makes to the product's stock. Widened
    /// to `i64` so negating `i32::MIN` cannot overflow.
    pub fn delta(&self, quantity: i32) -> i64 {
        let quantity = i64::from(quantity);
        match self {
            TransactionType::In => quantity,
            TransactionType::Out => -quantity,
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in" => Ok(TransactionType::In),
            "out" => Ok(TransactionType::Out),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// Manual stock adjustment against one product
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub transaction_type: TransactionType,
    pub quantity: i32,
    pub date: DateTime<Utc>,
}

impl Model {
    pub fn delta(&self) -> i64 {
        self.transaction_type.delta(self.quantity)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_sign_follows_direction() {
        assert_eq!(TransactionType::In.delta(5), 5);
        assert_eq!(TransactionType::Out.delta(5), -5);
        assert_eq!(TransactionType::Out.delta(-3), 3);
    }

    #[test]
    fn extreme_quantities_do_not_overflow() {
        assert_eq!(TransactionType::Out.delta(i32::MIN), 2_147_483_648);
        assert_eq!(TransactionType::In.delta(i32::MIN), -2_147_483_648);
    }

    #[test]
    fn parses_only_known_types() {
        assert_eq!("in".parse::<TransactionType>(), Ok(TransactionType::In));
        assert_eq!("out".parse::<TransactionType>(), Ok(TransactionType::Out));
        assert!("sideways".parse::<TransactionType>().is_err());
        assert!("".parse::<TransactionType>().is_err());
    }
}
