// src/message.rs
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_context: Option<UserContext>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Financial snapshot the caller attaches to personalise the coach's answer.
#[derive(Debug, Default, Clone)]
pub struct UserContext {
    pub income_this_month: Option<f64>,
    pub spent_this_month: Option<f64>,
    pub monthly_budget: Option<f64>,
    pub remaining_this_month: Option<f64>,
    pub spent_percentage_of_income: Option<f64>,
    pub spent_by_category: Option<Vec<(String, f64)>>,
    pub category_limits: Option<Vec<(String, f64)>>,
    pub recent_expenses: Option<Vec<RecentExpense>>,
    /// Keys the caller sent that carry nothing we render (null or unknown).
    pub ignored_keys: usize,
}

impl UserContext {
    /// True only for `{}`: any key the caller sent, even a null one, makes
    /// the context count.
    pub fn is_empty(&self) -> bool {
        self.ignored_keys == 0
            && self.income_this_month.is_none()
            && self.spent_this_month.is_none()
            && self.monthly_budget.is_none()
            && self.remaining_this_month.is_none()
            && self.spent_percentage_of_income.is_none()
            && self.spent_by_category.is_none()
            && self.category_limits.is_none()
            && self.recent_expenses.is_none()
    }
}

impl<'de> Deserialize<'de> for UserContext {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UserContextVisitor;

        impl<'de> Visitor<'de> for UserContextVisitor {
            type Value = UserContext;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a user context object")
            }

            fn visit_map<M>(self, mut map: M) -> Result<UserContext, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut ctx = UserContext::default();
                while let Some(key) = map.next_key::<String>()? {
                    let used = match key.as_str() {
                        "income_this_month" => set(&mut ctx.income_this_month, map.next_value()?),
                        "spent_this_month" => set(&mut ctx.spent_this_month, map.next_value()?),
                        "monthly_budget" => set(&mut ctx.monthly_budget, map.next_value()?),
                        "remaining_this_month" => {
                            set(&mut ctx.remaining_this_month, map.next_value()?)
                        }
                        "spent_percentage_of_income" => {
                            set(&mut ctx.spent_percentage_of_income, map.next_value()?)
                        }
                        "spent_by_category" => set(
                            &mut ctx.spent_by_category,
                            map.next_value::<Option<OrderedAmounts>>()?.map(|a| a.0),
                        ),
                        "category_limits" => set(
                            &mut ctx.category_limits,
                            map.next_value::<Option<OrderedAmounts>>()?.map(|a| a.0),
                        ),
                        "recent_expenses" => set(&mut ctx.recent_expenses, map.next_value()?),
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                            false
                        }
                    };
                    if !used {
                        ctx.ignored_keys += 1;
                    }
                }
                Ok(ctx)
            }
        }

        deserializer.deserialize_map(UserContextVisitor)
    }
}

// Stores `value`, reporting whether the key carried anything.
fn set<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    let used = value.is_some();
    *slot = value;
    used
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RecentExpense {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// JSON objects keyed by category name. Kept as pairs so the prompt lists
// categories in the order the client sent them.
struct OrderedAmounts(Vec<(String, f64)>);

impl<'de> Deserialize<'de> for OrderedAmounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedAmountsVisitor;

        impl<'de> Visitor<'de> for OrderedAmountsVisitor {
            type Value = OrderedAmounts;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object of category names to numbers")
            }

            fn visit_map<M>(self, mut map: M) -> Result<OrderedAmounts, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, amount)) = map.next_entry::<String, f64>()? {
                    pairs.push((name, amount));
                }
                Ok(OrderedAmounts(pairs))
            }
        }

        deserializer.deserialize_map(OrderedAmountsVisitor)
    }
}
