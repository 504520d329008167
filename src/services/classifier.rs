use serde_json::Value;

/// Result of scanning one value series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    NumericInteger(NumericSummary),
    NumericDecimal(NumericSummary),
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Decides whether a series is numeric or categorical. Total: any value that
/// does not parse as a finite number makes the whole series categorical, and
/// an empty series is categorical as well.
pub fn classify(series: &[Value]) -> Classification {
    let mut parsed = Vec::with_capacity(series.len());
    for value in series {
        match parse_number(value) {
            Some(n) => parsed.push(n),
            None => return Classification::Categorical,
        }
    }

    if parsed.is_empty() {
        return Classification::Categorical;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut all_integral = true;
    for &n in &parsed {
        min = min.min(n);
        max = max.max(n);
        all_integral = all_integral && n == n.trunc();
    }

    let summary = NumericSummary {
        min,
        max,
        count: parsed.len(),
    };
    if all_integral {
        Classification::NumericInteger(summary)
    } else {
        Classification::NumericDecimal(summary)
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(raw: serde_json::Value) -> Vec<Value> {
        raw.as_array().cloned().unwrap()
    }

    #[test]
    fn all_integral_series_is_numeric_integer() {
        let series = values(json!([10, 12, 15, 15, 15, 20]));
        let expected = NumericSummary {
            min: 10.0,
            max: 20.0,
            count: 6,
        };
        assert_eq!(classify(&series), Classification::NumericInteger(expected));
    }

    #[test]
    fn one_fractional_value_makes_series_decimal() {
        let series = values(json!([10, 12.5, 15]));
        match classify(&series) {
            Classification::NumericDecimal(summary) => {
                assert_eq!(summary.min, 10.0);
                assert_eq!(summary.max, 15.0);
                assert_eq!(summary.count, 3);
            }
            other => panic!("expected decimal classification, got {:?}", other),
        }
    }

    #[test]
    fn numeric_strings_parse_like_numbers() {
        let series = values(json!(["10", " 12 ", "15.0"]));
        assert!(matches!(
            classify(&series),
            Classification::NumericInteger(_)
        ));
    }

    #[test]
    fn one_unparseable_value_makes_series_categorical() {
        let series = values(json!([10, "doce", 15]));
        assert_eq!(classify(&series), Classification::Categorical);
    }

    #[test]
    fn text_series_is_categorical() {
        let series = values(json!(["red", "blue", "red"]));
        assert_eq!(classify(&series), Classification::Categorical);
    }

    #[test]
    fn nulls_and_booleans_are_categorical() {
        assert_eq!(classify(&values(json!([1, null]))), Classification::Categorical);
        assert_eq!(classify(&values(json!([true, false]))), Classification::Categorical);
    }

    #[test]
    fn non_finite_strings_are_categorical() {
        assert_eq!(classify(&values(json!(["inf", "1"]))), Classification::Categorical);
        assert_eq!(classify(&values(json!(["NaN"]))), Classification::Categorical);
    }

    #[test]
    fn empty_series_is_categorical() {
        assert_eq!(classify(&[]), Classification::Categorical);
    }

    #[test]
    fn negative_values_truncate_toward_zero() {
        let series = values(json!([-3, -1, 0]));
        assert!(matches!(
            classify(&series),
            Classification::NumericInteger(_)
        ));
        let series = values(json!([-3.5, -1]));
        assert!(matches!(classify(&series), Classification::NumericDecimal(_)));
    }
}
