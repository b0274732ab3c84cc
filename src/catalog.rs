// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, TransactionType};

pub const OTHER_INCOME: &str = "Outras Receitas";
pub const OTHER_EXPENSES: &str = "Outras Despesas";
pub const TRANSFER: &str = "Transferência";

const DEFAULT_CATEGORIES: &[(&str, &str, TransactionType)] = &[
    ("cat_income_salary", "Salário", TransactionType::Income),
    ("cat_income_freelance", "Freelance", TransactionType::Income),
    ("cat_income_investments", "Investimentos", TransactionType::Income),
    ("cat_income_gifts", "Presentes", TransactionType::Income),
    ("cat_income_other", OTHER_INCOME, TransactionType::Income),
    ("cat_expense_groceries", "Supermercado", TransactionType::Expense),
    ("cat_expense_rent_mortgage", "Aluguel/Hipoteca", TransactionType::Expense),
    ("cat_expense_utilities", "Contas (Luz, Água, Gás)", TransactionType::Expense),
    ("cat_expense_transport", "Transporte", TransactionType::Expense),
    ("cat_expense_dining_out", "Restaurantes/Lanches", TransactionType::Expense),
    ("cat_expense_entertainment", "Entretenimento", TransactionType::Expense),
    ("cat_expense_healthcare", "Saúde", TransactionType::Expense),
    ("cat_expense_education", "Educação", TransactionType::Expense),
    ("cat_expense_shopping", "Compras", TransactionType::Expense),
    ("cat_expense_other", OTHER_EXPENSES, TransactionType::Expense),
    ("cat_transfer", TRANSFER, TransactionType::Transfer),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name, t)| Category {
            id: id.to_string(),
            name: name.to_string(),
            r#type: *t,
        })
        .collect()
}

/// Static category lookup used to classify imported rows.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

impl Catalog {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn of_type(&self, t: TransactionType) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.r#type == t)
    }

    /// Case-insensitive match restricted to categories of type `t`.
    pub fn find(&self, name: &str, t: TransactionType) -> Option<&Category> {
        let wanted = name.trim().to_lowercase();
        self.of_type(t).find(|c| c.name.to_lowercase() == wanted)
    }

    /// Generic bucket for rows whose category is not in the catalog.
    pub fn fallback(&self, t: TransactionType) -> &'static str {
        match t {
            TransactionType::Income => OTHER_INCOME,
            TransactionType::Expense => OTHER_EXPENSES,
            TransactionType::Transfer => TRANSFER,
        }
    }
}
