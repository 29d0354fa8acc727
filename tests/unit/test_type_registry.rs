#[cfg(test)]
mod tests {
    use ostrichdb_dashboard::models::{DataType, InputKind, TypeCategory, TypedValue};
    use ostrichdb_dashboard::services::type_registry::{
        MAX_NAME_LENGTH, decode_transport, default_value_for, format_for_transport, parse_array,
        type_info, types_by_category, validate_name, validate_value,
    };
    use ostrichdb_dashboard::services::ValidationError;

    #[test]
    fn test_boolean_requires_literal_true_or_false() {
        let err = validate_value("yes", DataType::Boolean).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'true'"));
        assert!(message.contains("'false'"));

        assert!(validate_value("true", DataType::Boolean).is_ok());
        assert!(validate_value("false", DataType::Boolean).is_ok());
        assert!(validate_value("TRUE", DataType::Boolean).is_err());
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(
            validate_name("my record"),
            Err(ValidationError::NameContainsWhitespace)
        );
        assert!(validate_name("my-record_1").is_ok());
        assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
        assert_eq!(validate_name("   "), Err(ValidationError::EmptyName));
        assert_eq!(
            validate_name("dots.not.allowed"),
            Err(ValidationError::InvalidNameCharacters)
        );

        let longest = "a".repeat(MAX_NAME_LENGTH);
        assert!(validate_name(&longest).is_ok());
        assert_eq!(
            validate_name(&format!("{}a", longest)),
            Err(ValidationError::NameTooLong {
                max: MAX_NAME_LENGTH
            })
        );
    }

    #[test]
    fn test_validation_is_repeatable() {
        let samples = [
            "", "42", "-7", "3.5", "true", "null", "x", "2024-01-15", "14:30:00",
            "2024-01-15T14:30:00", "[1,2]", r#"["a","b"]"#, "[", "NaN",
        ];
        for data_type in DataType::ALL {
            for value in samples {
                assert_eq!(
                    validate_value(value, data_type),
                    validate_value(value, data_type),
                    "{} / {}",
                    value,
                    data_type
                );
            }
        }
    }

    #[test]
    fn test_scalar_types() {
        assert!(validate_value("-12", DataType::Integer).is_ok());
        assert!(validate_value("1.0", DataType::Integer).is_err());
        assert!(validate_value("1e3", DataType::Float).is_ok());
        assert!(validate_value("inf", DataType::Float).is_err());
        assert!(validate_value("Z", DataType::Char).is_ok());
        assert!(validate_value("ZZ", DataType::Char).is_err());
        assert!(validate_value("null", DataType::Null).is_ok());
        assert!(validate_value("nil", DataType::Null).is_err());
        assert!(validate_value("550e8400-e29b-41d4-a716-446655440000", DataType::Uuid).is_ok());
        assert!(validate_value("550e8400e29b41d4a716446655440000", DataType::Uuid).is_err());
        assert!(validate_value("2024-01-15T25:00:00", DataType::DateTime).is_err());
        assert!(validate_value("anything at all", DataType::String).is_ok());
    }

    #[test]
    fn test_invalid_value_names_the_type() {
        let err = validate_value("abc", DataType::Integer).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidValue {
                data_type: DataType::Integer,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Invalid INTEGER value"));
    }

    #[test]
    fn test_array_validation() {
        assert!(validate_value("[true,false]", DataType::BooleanArray).is_ok());
        assert!(validate_value(r#"["yes"]"#, DataType::BooleanArray).is_err());
        assert!(validate_value(r#"["2024-01-15"]"#, DataType::DateArray).is_ok());
        assert!(validate_value(r#"[""]"#, DataType::StringArray).is_err());
        assert!(validate_value(r#"[["nested"]]"#, DataType::StringArray).is_err());
        assert!(validate_value(r#"{"a":1}"#, DataType::StringArray).is_err());
    }

    #[test]
    fn test_default_value_is_always_empty() {
        for data_type in DataType::ALL {
            assert_eq!(default_value_for(data_type), "");
            assert_eq!(TypedValue::placeholder(data_type).raw, "");
        }
    }

    #[test]
    fn test_transport_round_trip_for_every_array_type() {
        for data_type in DataType::ALL.into_iter().filter(|t| t.is_array()) {
            let example = type_info(data_type).example;
            let expected = parse_array(example).unwrap();
            let transport = format_for_transport(example, data_type);

            assert_eq!(
                decode_transport(&transport),
                Some(expected),
                "round trip of {}",
                data_type
            );
        }
    }

    #[test]
    fn test_scalars_pass_through_transport() {
        for data_type in DataType::ALL.into_iter().filter(|t| !t.is_array()) {
            let example = type_info(data_type).example;
            assert_eq!(format_for_transport(example, data_type), example);
        }
    }

    #[test]
    fn test_type_names_and_aliases() {
        assert_eq!("STRING".parse::<DataType>(), Ok(DataType::String));
        assert_eq!("str".parse::<DataType>(), Ok(DataType::String));
        assert_eq!("INT".parse::<DataType>(), Ok(DataType::Integer));
        assert_eq!("[]flt".parse::<DataType>(), Ok(DataType::FloatArray));
        assert_eq!("[]BOOL".parse::<DataType>(), Ok(DataType::BooleanArray));
        assert!("INVALID".parse::<DataType>().is_err());
        assert!("[]NULL".parse::<DataType>().is_err());

        for data_type in DataType::ALL {
            assert_eq!(data_type.as_str().parse::<DataType>(), Ok(data_type));
            let json = serde_json::to_string(&data_type).unwrap();
            assert_eq!(json, format!("\"{}\"", data_type));
        }
    }

    #[test]
    fn test_type_info_presentation() {
        let boolean = type_info(DataType::Boolean);
        assert_eq!(
            boolean.input,
            InputKind::Select {
                options: &["true", "false"]
            }
        );
        assert_eq!(boolean.category, TypeCategory::Primitive);

        let date = type_info(DataType::Date);
        assert_eq!(date.placeholder(), "e.g. 2024-01-15");
        assert_eq!(date.category, TypeCategory::DateTime);

        assert_eq!(
            type_info(DataType::UuidArray).input,
            InputKind::JsonArray
        );
        assert_eq!(type_info(DataType::Null).category, TypeCategory::Special);

        let groups = types_by_category();
        assert_eq!(groups[0].0, TypeCategory::Primitive);
        assert!(groups[3].1.iter().all(|t| t.is_array()));
    }
}
