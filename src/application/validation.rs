//! Caller-input validation
//!
//! Pure validators for customer data. Checkout accumulates every failure
//! and reports the whole list, never just the first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::dto::CustomerInput;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("static regex")
});

fn digits_of(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// CPF check-digit verification (11 digits, two verifier digits mod 11).
pub fn validate_cpf(raw: &str) -> bool {
    let digits = digits_of(raw);
    if digits.len() != 11 || all_equal(&digits) {
        return false;
    }

    let dv = |take: usize| -> u32 {
        let weight_start = (take + 1) as u32;
        let sum: u32 = digits
            .iter()
            .take(take)
            .enumerate()
            .map(|(i, d)| d * (weight_start - i as u32))
            .sum();
        (sum * 10) % 11 % 10
    };

    dv(9) == digits[9] && dv(10) == digits[10]
}

/// CNPJ check-digit verification (14 digits, weighted mod 11).
pub fn validate_cnpj(raw: &str) -> bool {
    let digits = digits_of(raw);
    if digits.len() != 14 || all_equal(&digits) {
        return false;
    }

    const WEIGHTS_1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    const WEIGHTS_2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

    let dv = |weights: &[u32]| -> u32 {
        let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
        match sum % 11 {
            0 | 1 => 0,
            rest => 11 - rest,
        }
    };

    dv(&WEIGHTS_1) == digits[12] && dv(&WEIGHTS_2) == digits[13]
}

/// A tax id is a valid CPF or CNPJ depending on its digit count.
pub fn validate_tax_id(raw: &str) -> bool {
    match digits_of(raw).len() {
        11 => validate_cpf(raw),
        14 => validate_cnpj(raw),
        _ => false,
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Validate the customer block, accumulating every failure.
pub fn validate_customer(customer: &CustomerInput) -> Vec<String> {
    let mut errors = Vec::new();

    if customer.name.trim().is_empty() {
        errors.push("nome é obrigatório".to_string());
    }
    if !validate_email(&customer.email) {
        errors.push(format!("e-mail inválido: {}", customer.email));
    }
    if customer.phone.trim().is_empty() {
        errors.push("telefone é obrigatório".to_string());
    }
    if let Some(tax_id) = customer.tax_id.as_deref() {
        if !tax_id.trim().is_empty() && !validate_tax_id(tax_id) {
            errors.push(format!("CPF/CNPJ inválido: {tax_id}"));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn customer(name: &str, email: &str, phone: &str, tax_id: Option<&str>) -> CustomerInput {
        CustomerInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            tax_id: tax_id.map(String::from),
        }
    }

    #[rstest]
    #[case("529.982.247-25")]
    #[case("52998224725")]
    #[case("111.444.777-35")]
    fn accepts_valid_cpfs(#[case] cpf: &str) {
        assert!(validate_cpf(cpf));
    }

    #[rstest]
    #[case("529.982.247-26")]
    #[case("111.111.111-11")]
    #[case("1234567890")]
    fn rejects_invalid_cpfs(#[case] cpf: &str) {
        assert!(!validate_cpf(cpf));
    }

    #[rstest]
    #[case("11.222.333/0001-81")]
    #[case("11222333000181")]
    fn accepts_valid_cnpjs(#[case] cnpj: &str) {
        assert!(validate_cnpj(cnpj));
    }

    #[rstest]
    #[case("11.222.333/0001-80")]
    #[case("11.111.111/1111-11")]
    fn rejects_invalid_cnpjs(#[case] cnpj: &str) {
        assert!(!validate_cnpj(cnpj));
    }

    #[test]
    fn email_pattern_accepts_common_shapes() {
        assert!(validate_email("cliente@example.com.br"));
        assert!(validate_email("a.b+tag@sub.dominio.com"));
        assert!(!validate_email("sem-arroba.com"));
        assert!(!validate_email("x@semtld"));
    }

    #[test]
    fn accumulates_every_customer_error() {
        let errors = validate_customer(&customer("", "ruim", "", Some("123")));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn valid_customer_yields_no_errors() {
        let errors = validate_customer(&customer(
            "Maria Silva",
            "maria@example.com",
            "47 99999-0000",
            Some("529.982.247-25"),
        ));
        assert!(errors.is_empty());
    }

    #[test]
    fn empty_tax_id_is_not_validated() {
        let errors = validate_customer(&customer("Ana", "ana@example.com", "47 98888-0000", Some("")));
        assert!(errors.is_empty());
    }
}
