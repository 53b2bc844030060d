// src/services/prompt_builder.rs
use crate::message::{RecentExpense, UserContext};

pub const BASE_INSTRUCTION: &str = "You are a friendly financial coach helping the user manage their money. \
Give practical, personalised advice. Be concise and encouraging.";

const CONTEXT_HEADER: &str = "\n\n**Current user data (use this to personalise your answers):**";
const CLOSING_INSTRUCTION: &str =
    "\nRefer to their numbers when relevant and suggest concrete next steps.";

/// Only the newest expenses are worth the tokens.
pub const MAX_RECENT_EXPENSES: usize = 5;

/// Build the system prompt for one chat turn.
///
/// Without a context, or with an empty `{}` one, the base instruction is
/// returned as-is. Otherwise each known field that has a value is rendered on
/// its own line, in a fixed order, between a header and a closing instruction.
pub fn build_system_prompt(context: Option<&UserContext>) -> String {
    let ctx = match context {
        Some(ctx) if !ctx.is_empty() => ctx,
        _ => return BASE_INSTRUCTION.to_string(),
    };

    let mut parts = vec![BASE_INSTRUCTION.to_string(), CONTEXT_HEADER.to_string()];

    if let Some(income) = ctx.income_this_month {
        parts.push(format!("- Income this month: {:.2}", income));
    }
    if let Some(spent) = ctx.spent_this_month {
        parts.push(format!("- Spent this month: {:.2}", spent));
    }
    if let Some(budget) = ctx.monthly_budget.filter(|b| *b > 0.0) {
        parts.push(format!("- Monthly budget: {:.2}", budget));
    }
    if let Some(remaining) = ctx.remaining_this_month {
        parts.push(format!("- Remaining this month: {:.2}", remaining));
    }
    if let Some(pct) = ctx.spent_percentage_of_income {
        parts.push(format!("- Spent as % of income: {:.1}%", pct));
    }

    if let Some(by_cat) = ctx.spent_by_category.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!("- Spending by category: {}", join_amounts(by_cat)));
    }
    if let Some(limits) = ctx.category_limits.as_deref().filter(|l| !l.is_empty()) {
        parts.push(format!("- Category limits (budgets): {}", join_amounts(limits)));
    }

    if let Some(recent) = ctx.recent_expenses.as_deref().filter(|r| !r.is_empty()) {
        let lines: Vec<String> = recent
            .iter()
            .take(MAX_RECENT_EXPENSES)
            .map(format_expense)
            .collect();
        parts.push(format!("- Recent expenses:\n{}", lines.join("\n")));
    }

    parts.push(CLOSING_INSTRUCTION.to_string());
    parts.join("\n")
}

fn join_amounts(pairs: &[(String, f64)]) -> String {
    pairs
        .iter()
        .map(|(name, amount)| format!("{}: {:.2}", name, amount))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_expense(expense: &RecentExpense) -> String {
    let mut line = format!(
        "  {}: {:.2} ({})",
        expense.category.as_deref().unwrap_or("?"),
        expense.amount.unwrap_or(0.0),
        expense.date.as_deref().unwrap_or(""),
    );
    if let Some(note) = expense.note.as_deref().filter(|n| !n.is_empty()) {
        line.push_str(&format!(" — {}", note));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, amount: f64) -> RecentExpense {
        RecentExpense {
            category: Some(category.to_string()),
            amount: Some(amount),
            date: Some("2024-05-01".to_string()),
            note: None,
        }
    }

    #[test]
    fn no_context_yields_base_instruction() {
        assert_eq!(build_system_prompt(None), BASE_INSTRUCTION);
        assert_eq!(build_system_prompt(Some(&UserContext::default())), BASE_INSTRUCTION);
    }

    #[test]
    fn context_with_only_null_keys_keeps_header_and_closing() {
        let ctx = UserContext { ignored_keys: 1, ..Default::default() };
        let expected = format!(
            "{}\n\n\n**Current user data (use this to personalise your answers):**\n\
             \nRefer to their numbers when relevant and suggest concrete next steps.",
            BASE_INSTRUCTION
        );
        assert_eq!(build_system_prompt(Some(&ctx)), expected);
    }

    #[test]
    fn headline_figures_render_in_fixed_order() {
        let ctx = UserContext {
            income_this_month: Some(3000.0),
            spent_this_month: Some(1234.5),
            monthly_budget: Some(2000.0),
            remaining_this_month: Some(765.5),
            spent_percentage_of_income: Some(41.16),
            ..Default::default()
        };
        let expected = format!(
            "{}\n\n\n**Current user data (use this to personalise your answers):**\n\
             - Income this month: 3000.00\n\
             - Spent this month: 1234.50\n\
             - Monthly budget: 2000.00\n\
             - Remaining this month: 765.50\n\
             - Spent as % of income: 41.2%\n\
             \nRefer to their numbers when relevant and suggest concrete next steps.",
            BASE_INSTRUCTION
        );
        assert_eq!(build_system_prompt(Some(&ctx)), expected);
    }

    #[test]
    fn zero_budget_is_left_out() {
        let ctx = UserContext { monthly_budget: Some(0.0), ..Default::default() };
        assert!(!build_system_prompt(Some(&ctx)).contains("Monthly budget"));

        let ctx = UserContext { monthly_budget: Some(150.5), ..Default::default() };
        assert!(build_system_prompt(Some(&ctx)).contains("- Monthly budget: 150.50"));
    }

    #[test]
    fn categories_join_in_given_order() {
        let ctx = UserContext {
            spent_by_category: Some(vec![("Food".to_string(), 12.5), ("Rent".to_string(), 800.0)]),
            category_limits: Some(vec![("Rent".to_string(), 900.0), ("Food".to_string(), 200.0)]),
            ..Default::default()
        };
        let prompt = build_system_prompt(Some(&ctx));
        assert!(prompt.contains("- Spending by category: Food: 12.50, Rent: 800.00\n"));
        assert!(prompt.contains("- Category limits (budgets): Rent: 900.00, Food: 200.00\n"));
    }

    #[test]
    fn empty_category_map_adds_no_line() {
        let ctx = UserContext { spent_by_category: Some(vec![]), ..Default::default() };
        let prompt = build_system_prompt(Some(&ctx));
        assert!(!prompt.contains("Spending by category"));
        assert!(prompt.ends_with("suggest concrete next steps."));
    }

    #[test]
    fn recent_expenses_truncate_to_five() {
        let recent: Vec<RecentExpense> =
            (1..=7).map(|i| expense(&format!("Cat{}", i), i as f64)).collect();
        let ctx = UserContext { recent_expenses: Some(recent), ..Default::default() };
        let prompt = build_system_prompt(Some(&ctx));

        let listed: Vec<&str> = prompt.lines().filter(|l| l.starts_with("  Cat")).collect();
        assert_eq!(
            listed,
            vec![
                "  Cat1: 1.00 (2024-05-01)",
                "  Cat2: 2.00 (2024-05-01)",
                "  Cat3: 3.00 (2024-05-01)",
                "  Cat4: 4.00 (2024-05-01)",
                "  Cat5: 5.00 (2024-05-01)",
            ]
        );
        assert!(prompt.contains("- Recent expenses:\n  Cat1"));
    }

    #[test]
    fn expense_defaults_and_notes() {
        let ctx = UserContext {
            recent_expenses: Some(vec![
                RecentExpense::default(),
                RecentExpense { note: Some(String::new()), ..expense("Food", 9.99) },
                RecentExpense { note: Some("lunch".to_string()), ..expense("Food", 4.0) },
            ]),
            ..Default::default()
        };
        let prompt = build_system_prompt(Some(&ctx));
        assert!(prompt.contains("\n  ?: 0.00 ()\n"));
        assert!(prompt.contains("\n  Food: 9.99 (2024-05-01)\n"));
        assert!(prompt.contains("\n  Food: 4.00 (2024-05-01) — lunch\n"));
    }
}
