pub mod casbin_rules;

pub use casbin_rules::{
    ActiveModel as CasbinRuleActiveModel, Column as CasbinRuleColumn, Entity as CasbinRules, Model as CasbinRule,
};
