//! Extraction prompt and response schema.
//!
//! Keeping the instruction and the schema together means the two never drift:
//! the prompt names the fields, the schema pins their types, and both backends
//! read from here. Callers can override the instruction via
//! [`crate::config::ExtractionConfig::prompt`]; the schema is fixed.

use serde_json::{json, Value};

/// Default instruction sent alongside every receipt.
pub const DEFAULT_EXTRACTION_PROMPT: &str = r#"Extract the following details from the provided receipt document (image or PDF). First look for VAT identification number (vatNumber) in the document and associated name of the company (companyName).
Ensure all fields from the schema are populated if the information is present in the document.
If a piece of information is not found, you may omit the field or use a suitable placeholder like 'N/A' if the schema requires it,
but prioritize extracting actual values. For numerical values (prices, VAT amount, VAT rate), provide them as numbers (float).
For VAT rate, if it's written as e.g. '21%', provide the number 21.
Also, extract the date of sale (transaction date) from the receipt. It might be in dd/mm/yyyy or dd.mm.yyyy format. If multiple dates are present (e.g., issue date, due date), use the primary transaction/sale date."#;

/// The seven fields every response must carry, in output order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "companyName",
    "vatNumber",
    "priceWithoutVAT",
    "vat",
    "vatRate",
    "priceIncludingVAT",
    "dateOfSale",
];

/// Structured-output schema in the Gemini `responseSchema` dialect
/// (OpenAPI subset with upper-case type names).
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "required": REQUIRED_FIELDS,
        "properties": {
            "companyName": {
                "type": "STRING",
                "description": "The legal name of the company that issued the receipt always associated with the VAT identification number. Legal name always includes legal form (e.g. s.r.o., a.s. etc.)"
            },
            "vatNumber": {
                "type": "STRING",
                "description": "The VAT identification number of the company."
            },
            "priceWithoutVAT": {
                "type": "NUMBER",
                "format": "float",
                "description": "The total price of goods/services before VAT is applied. Use 0.0 if not explicitly found."
            },
            "vat": {
                "type": "NUMBER",
                "format": "float",
                "description": "The total VAT amount charged. Use 0.0 if not explicitly found."
            },
            "vatRate": {
                "type": "NUMBER",
                "format": "float",
                "description": "The VAT rate as a percentage (e.g., 21 for 21%). Use 0.0 if not explicitly found."
            },
            "priceIncludingVAT": {
                "type": "NUMBER",
                "format": "float",
                "description": "The final price including VAT. This is usually the most prominent total amount."
            },
            "dateOfSale": {
                "type": "STRING",
                "description": "The date of sale or transaction date from the receipt, in dd.mm.yyyy format."
            }
        }
    })
}

/// Instruction for providers without a native structured-output switch.
///
/// Appends the schema to `prompt` and asks for a bare JSON object.
pub fn schema_instruction(prompt: &str) -> String {
    let schema = serde_json::to_string_pretty(&response_schema()).unwrap_or_default();
    format!(
        "{prompt}\n\nRespond with a single JSON object that conforms to this schema:\n\n{schema}\n\n\
         Output ONLY the JSON object. Do NOT wrap it in ```json fences. Do NOT add commentary."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_every_field() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
        for field in REQUIRED_FIELDS {
            assert!(
                schema["properties"].get(field).is_some(),
                "missing property {field}"
            );
        }
    }

    #[test]
    fn numeric_fields_are_numbers() {
        let schema = response_schema();
        for field in ["priceWithoutVAT", "vat", "vatRate", "priceIncludingVAT"] {
            assert_eq!(schema["properties"][field]["type"], "NUMBER");
        }
        assert_eq!(schema["properties"]["dateOfSale"]["type"], "STRING");
    }

    #[test]
    fn schema_instruction_embeds_prompt_and_schema() {
        let text = schema_instruction("Read the receipt.");
        assert!(text.starts_with("Read the receipt."));
        assert!(text.contains("\"priceIncludingVAT\""));
    }
}
