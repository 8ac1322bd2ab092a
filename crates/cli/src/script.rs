//! Line-oriented session scripts.
//!
//! One step per line, `#` starts a comment. Multi-field arguments are `|`-separated:
//!
//! ```text
//! list men
//! add m1 2
//! checkout
//! delivery Ada|Lovelace|ada@example.com|12 St James's Square|London|SW1Y 4JH
//! payment
//! pay Ada Lovelace|4242 4242 4242 4242|12/30|123
//! confirm
//! ```

use core::str::FromStr;

use thiserror::Error;

use storefront_catalog::CategoryFilter;
use storefront_checkout::{DeliveryInfo, PaymentDetails};
use storefront_core::{Destination, ProductId, UserId};

/// The session run when no script is given.
pub const DEMO_SCRIPT: &str = include_str!("../scripts/demo.session");

/// A single line that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("unknown step '{0}'")]
    Unknown(String),

    #[error("{0}")]
    BadArguments(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown step '{step}'")]
    UnknownStep { line: usize, step: String },

    #[error("line {line}: {message}")]
    BadArguments { line: usize, message: String },
}

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Visit(Destination),
    List(CategoryFilter),
    Select { id: ProductId, index: usize },
    View(ProductId),
    Add { id: ProductId, quantity: u32 },
    Update { id: ProductId, delta: i64 },
    Remove(ProductId),
    Cart,
    Checkout,
    Delivery(DeliveryInfo),
    Payment,
    Pay(PaymentDetails),
    Confirm,
    Login { id: UserId, name: String, email: String },
    Logout,
    Newsletter(String),
    Field { form_id: String, field: String },
}

impl FromStr for Step {
    type Err = StepError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        parse_step(line).map_err(StepError::BadArguments)?.ok_or_else(|| {
            let verb = line.split_whitespace().next().unwrap_or_default();
            StepError::Unknown(verb.to_string())
        })
    }
}

/// `Ok(None)` for an unknown verb.
fn parse_step(line: &str) -> Result<Option<Step>, String> {
    let (verb, rest) = line
        .trim()
        .split_once(char::is_whitespace)
        .map(|(v, r)| (v, r.trim()))
        .unwrap_or((line.trim(), ""));

    let words: Vec<&str> = rest.split_whitespace().collect();
    let product = |pos: usize| -> Result<ProductId, String> {
        words
            .get(pos)
            .ok_or_else(|| format!("{verb}: missing product id"))?
            .parse()
            .map_err(|e| format!("{verb}: {e}"))
    };
    let number = |pos: usize, default: Option<&str>| -> Result<i64, String> {
        words
            .get(pos)
            .copied()
            .or(default)
            .ok_or_else(|| format!("{verb}: missing number"))?
            .parse()
            .map_err(|e| format!("{verb}: {e}"))
    };
    let fields = |expected: usize| -> Result<Vec<String>, String> {
        let parts: Vec<String> = rest.split('|').map(|p| p.trim().to_string()).collect();
        if parts.len() == expected {
            Ok(parts)
        } else {
            Err(format!(
                "{verb}: expected {expected} '|'-separated fields, got {}",
                parts.len()
            ))
        }
    };

    let step = match verb.to_ascii_lowercase().as_str() {
        "visit" => Step::Visit(destination(rest)?),
        "list" => Step::List(if rest.is_empty() {
            CategoryFilter::All
        } else {
            rest.parse().map_err(|e| format!("list: {e}"))?
        }),
        "select" => Step::Select {
            id: product(0)?,
            index: usize::try_from(number(1, Some("0"))?)
                .map_err(|e| format!("select: {e}"))?,
        },
        "view" => Step::View(product(0)?),
        "add" => Step::Add {
            id: product(0)?,
            quantity: u32::try_from(number(1, Some("1"))?)
                .map_err(|e| format!("add: {e}"))?,
        },
        "update" => Step::Update {
            id: product(0)?,
            delta: number(1, None)?,
        },
        "remove" => Step::Remove(product(0)?),
        "cart" => Step::Cart,
        "checkout" => Step::Checkout,
        "delivery" => {
            let f = fields(6)?;
            Step::Delivery(DeliveryInfo {
                first_name: f[0].clone(),
                last_name: f[1].clone(),
                email: f[2].clone(),
                phone: None,
                address: f[3].clone(),
                city: f[4].clone(),
                zip: f[5].clone(),
            })
        }
        "payment" => Step::Payment,
        "pay" => {
            let f = fields(4)?;
            Step::Pay(PaymentDetails {
                card_name: f[0].clone(),
                card_number: f[1].clone(),
                expiry: f[2].clone(),
                cvv: f[3].clone(),
            })
        }
        "confirm" => Step::Confirm,
        "login" => {
            let f = fields(3)?;
            Step::Login {
                id: f[0].parse().map_err(|e| format!("login: {e}"))?,
                name: f[1].clone(),
                email: f[2].clone(),
            }
        }
        "logout" => Step::Logout,
        "newsletter" => Step::Newsletter(if rest.is_empty() {
            "footer".to_string()
        } else {
            rest.to_string()
        }),
        "field" => match words.as_slice() {
            [form_id, field] => Step::Field {
                form_id: form_id.to_string(),
                field: field.to_string(),
            },
            _ => return Err("field: expected <form_id> <field>".to_string()),
        },
        _ => return Ok(None),
    };

    Ok(Some(step))
}

fn destination(name: &str) -> Result<Destination, String> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "home" | "" => Destination::Home,
        "shop" => Destination::Shop,
        "cart" => Destination::Cart,
        "account" => Destination::Account,
        other => return Err(format!("visit: unknown view '{other}'")),
    })
}

/// Parse a whole script, skipping blank lines and comments.
pub fn parse_script(source: &str) -> Result<Vec<Step>, ScriptError> {
    source
        .lines()
        .enumerate()
        .map(|(n, raw)| (n + 1, raw.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line, text)| {
            text.parse::<Step>().map_err(|err| match err {
                StepError::Unknown(step) => ScriptError::UnknownStep { line, step },
                StepError::BadArguments(message) => ScriptError::BadArguments { line, message },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_script_parses() {
        let steps = parse_script(DEMO_SCRIPT).unwrap();
        assert!(steps.contains(&Step::Confirm));
        assert!(steps.iter().any(|s| matches!(s, Step::Pay(_))));
    }

    #[test]
    fn parses_quantities_with_defaults() {
        assert_eq!(
            "add m1".parse::<Step>().unwrap(),
            Step::Add {
                id: ProductId::new("m1"),
                quantity: 1
            }
        );
        assert_eq!(
            "update m1 -3".parse::<Step>().unwrap(),
            Step::Update {
                id: ProductId::new("m1"),
                delta: -3
            }
        );
        assert!("add m1 -1".parse::<Step>().is_err());
    }

    #[test]
    fn delivery_fields_are_pipe_separated() {
        let step: Step = "delivery Ada|Lovelace|ada@example.com|12 St James's Square|London|SW1Y 4JH"
            .parse()
            .unwrap();
        match step {
            Step::Delivery(info) => {
                assert_eq!(info.address, "12 St James's Square");
                assert_eq!(info.zip, "SW1Y 4JH");
            }
            other => panic!("unexpected step {other:?}"),
        }
        assert!("delivery Ada|Lovelace".parse::<Step>().is_err());
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_script("# header\nlist men\n\nfly away\n").unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownStep {
                line: 4,
                step: "fly".into()
            }
        );

        let err = parse_script("view\n").unwrap_err();
        assert!(matches!(err, ScriptError::BadArguments { line: 1, .. }));
    }

    #[test]
    fn comments_are_stripped() {
        let steps = parse_script("cart   # show the cart\nlist kids").unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0], Step::Cart);
    }
}
