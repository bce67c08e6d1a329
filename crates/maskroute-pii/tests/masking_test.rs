//! End-to-end masking tests.
//!
//! Exercise the public [`PiiMasker`] API across every category, the
//! unmasking of downstream responses and the failure modes that must never
//! produce partially masked output.

use maskroute_pii::{Category, Error, Gazetteer, MaskerConfig, PiiMasker, RecognizerConfig};
use std::io::Write;
use std::sync::Arc;

mod common;
use common::*;

mod detection {
    use super::*;

    #[test]
    fn test_finds_emails_cards_and_phones() {
        let text = "Hello, my email is johndoe@gmail.com and my friend's email is \
                    sarah.connor@someotherdomain.pl, our credit card numbers are \
                    1234-5678-1234-5678 and 1234567812345678. \
                    We also have phone numbers: +27 21 123 4567 and +11491570129";

        let masker = PiiMasker::from_config(regex_only_config()).unwrap();
        let doc = masker.mask(text).unwrap();
        let matches = doc.matches();

        assert_eq!(
            matches.texts(Category::Email),
            vec!["johndoe@gmail.com", "sarah.connor@someotherdomain.pl"]
        );
        assert_eq!(
            matches.texts(Category::CreditCard),
            vec!["1234-5678-1234-5678", "1234567812345678"]
        );
        assert_eq!(
            matches.texts(Category::PhoneNumber),
            vec!["+27 21 123 4567 ", "+11491570129"]
        );
    }

    #[test]
    fn test_finds_people_and_organizations() {
        let text = "Hello, my name is John Doe and I work for Dune Spice Mining Industries. \
                    My friend is Sarah Connor and she works for AI Supremacy Inc.";

        let masker = PiiMasker::from_config(MaskerConfig::default()).unwrap();
        let doc = masker.mask(text).unwrap();

        assert_eq!(
            doc.matches().texts(Category::Name),
            vec!["John Doe", "Sarah Connor"]
        );
        assert_eq!(
            doc.matches().texts(Category::Organization),
            vec!["Dune Spice Mining Industries", "AI Supremacy Inc."]
        );
    }

    #[test]
    fn test_contact_scenario() {
        let text = "Contact john@x.com or call +1 555 123 4567.";
        let masker = PiiMasker::from_config(regex_only_config()).unwrap();
        let doc = masker.mask(text).unwrap();

        assert_eq!(doc.matches().texts(Category::Email), vec!["john@x.com"]);
        assert_eq!(
            doc.matches().texts(Category::PhoneNumber),
            vec!["+1 555 123 4567"]
        );
        assert!(!doc.masked_text().contains("john@x.com"));
        assert!(!doc.masked_text().contains("+1 555 123 4567"));

        let email = doc.substitutions().replacement_for("john@x.com").unwrap();
        let phone = doc
            .substitutions()
            .replacement_for("+1 555 123 4567")
            .unwrap();
        let response = format!("Sure, I will write to {} and then ring {}.", email, phone);

        assert_eq!(
            doc.unmask(&response).unwrap(),
            "Sure, I will write to john@x.com and then ring +1 555 123 4567."
        );
    }

    #[test]
    fn test_long_digit_run_is_not_a_phone() {
        let text = "Account 012345678901234567 is closed";
        let masker = PiiMasker::from_config(regex_only_config()).unwrap();
        let doc = masker.mask(text).unwrap();

        assert!(doc.matches().texts(Category::PhoneNumber).is_empty());
        assert!(doc.substitutions().get("012345678901234567").is_none());
    }

    #[test]
    fn test_phone_over_digit_cap_is_excluded() {
        let text = "dial +1 555 123 4567 890 12 now";
        let masker = PiiMasker::from_config(regex_only_config()).unwrap();
        let doc = masker.mask(text).unwrap();

        assert!(doc.matches().texts(Category::PhoneNumber).is_empty());
        assert!(
            doc.substitutions()
                .iter()
                .all(|(_, s)| s.category != Category::PhoneNumber)
        );
    }

    #[test]
    fn test_disabled_entities_are_not_reported() {
        let config = MaskerConfig {
            detect_organization: false,
            ..MaskerConfig::default()
        };
        let masker =
            PiiMasker::with_recognizer(config, Arc::new(profile_recognizer())).unwrap();
        let doc = masker.mask(PROFILE_TEXT).unwrap();

        assert_eq!(doc.matches().texts(Category::Name), vec!["Radek Lejba"]);
        assert!(doc.matches().get(Category::Organization).is_none());
        assert!(doc.masked_text().contains("AI Supremacy Inc."));
    }

    #[test]
    fn test_gazetteer_from_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let gazetteer = Gazetteer {
            persons: vec!["Cher".to_string()],
            organizations: vec!["Blue Lantern Bakery".to_string()],
        };
        write!(file, "{}", serde_json::to_string(&gazetteer).unwrap()).unwrap();

        let config = MaskerConfig {
            recognizer: RecognizerConfig {
                enabled: true,
                gazetteer: Some(file.path().to_path_buf()),
            },
            ..MaskerConfig::default()
        };
        let masker = PiiMasker::from_config(config).unwrap();
        let doc = masker
            .mask("Cher ordered bread from Blue Lantern Bakery.")
            .unwrap();

        assert_eq!(doc.matches().texts(Category::Name), vec!["Cher"]);
        assert_eq!(
            doc.matches().texts(Category::Organization),
            vec!["Blue Lantern Bakery"]
        );
    }
}

mod masking {
    use super::*;

    #[test]
    fn test_masked_text_carries_replacements() {
        let masker = scripted_masker(profile_recognizer());
        let doc = masker.mask(PROFILE_TEXT).unwrap();

        for original in [
            "radek.lejba@gmail.com",
            "1234-5678-1234-5678",
            "+48 123 456 789",
            "Radek Lejba",
            "AI Supremacy Inc.",
        ] {
            let replacement = doc.substitutions().replacement_for(original).unwrap();
            assert_ne!(replacement, original);
            assert!(!doc.masked_text().contains(original), "{original} leaked");
            assert!(doc.masked_text().contains(replacement));
        }
    }

    #[test]
    fn test_unmask_downstream_response() {
        let masker = scripted_masker(profile_recognizer());
        let doc = masker.mask(PROFILE_TEXT).unwrap();
        let map = doc.substitutions();

        let response = format!(
            "Mocked response, user email is {}, user credit card number is {}, \
             user phone number is {}, user name is {} and user works for {}",
            map.replacement_for("radek.lejba@gmail.com").unwrap(),
            map.replacement_for("1234-5678-1234-5678").unwrap(),
            map.replacement_for("+48 123 456 789").unwrap(),
            map.replacement_for("Radek Lejba").unwrap(),
            map.replacement_for("AI Supremacy Inc.").unwrap(),
        );

        assert_eq!(
            doc.unmask(&response).unwrap(),
            "Mocked response, user email is radek.lejba@gmail.com, user credit card number is \
             1234-5678-1234-5678, user phone number is +48 123 456 789, user name is \
             Radek Lejba and user works for AI Supremacy Inc."
        );
    }

    #[test]
    fn test_round_trip_restores_input() {
        let masker = scripted_masker(profile_recognizer());
        let doc = masker.mask(PROFILE_TEXT).unwrap();
        assert_eq!(doc.unmask(doc.masked_text()).unwrap(), PROFILE_TEXT);
    }

    #[test]
    fn test_repeated_entities_share_replacement() {
        let masker = scripted_masker(ScriptedRecognizer::new().person("John Doe"));
        let doc = masker.mask("John Doe called. Later John Doe emailed.").unwrap();

        assert_eq!(doc.matches().texts(Category::Name).len(), 2);
        assert_eq!(doc.substitutions().len(), 1);

        let replacement = doc.substitutions().replacement_for("John Doe").unwrap();
        assert_eq!(doc.masked_text().matches(replacement).count(), 2);
    }

    #[test]
    fn test_number_dense_text_masks_card() {
        let quantities: Vec<String> = (10..60).map(|n| n.to_string()).collect();
        let text = format!(
            "Order quantities: {}. Pay with card 4111 1111 1111 1111 please.",
            quantities.join(", ")
        );

        for seed in 0..20 {
            let config = MaskerConfig {
                seed: Some(seed),
                ..regex_only_config()
            };
            let masker = PiiMasker::from_config(config).unwrap();
            let doc = masker.mask(&text).unwrap();

            assert_eq!(
                doc.matches().texts(Category::CreditCard),
                vec!["4111 1111 1111 1111"]
            );
            assert_eq!(doc.matches().texts(Category::PhoneNumber).len(), 50);
            assert!(!doc.masked_text().contains("4111 1111 1111 1111"));
            assert_eq!(doc.unmask(doc.masked_text()).unwrap(), text);
        }
    }

    #[test]
    fn test_text_without_pii_is_unchanged() {
        let masker = scripted_masker(ScriptedRecognizer::new());
        let doc = masker.mask("the weather is mild today").unwrap();

        assert_eq!(doc.masked_text(), "the weather is mild today");
        assert!(doc.substitutions().is_empty());
        let categories: Vec<_> = doc.matches().categories().collect();
        assert_eq!(categories, Category::ALL.to_vec());
    }

    #[test]
    fn test_sequential_strategy_round_trip() {
        let config = MaskerConfig {
            substitution: maskroute_pii::SubstitutionStrategy::Sequential,
            ..regex_only_config()
        };
        let masker = PiiMasker::from_config(config).unwrap();
        let text = "Contact john@x.com or call +1 555 123 4567.";
        let doc = masker.mask(text).unwrap();

        assert_eq!(doc.unmask(doc.masked_text()).unwrap(), text);
    }

    #[test]
    fn test_document_survives_serialization() {
        let masker = scripted_masker(profile_recognizer());
        let doc = masker.mask(PROFILE_TEXT).unwrap();

        let json = serde_json::to_string(&doc).unwrap();
        let restored: maskroute_pii::MaskedDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.unmask(doc.masked_text()).unwrap(), PROFILE_TEXT);
    }
}

mod isolation {
    use super::*;

    #[test]
    fn test_runs_do_not_share_maps() {
        let masker = PiiMasker::from_config(regex_only_config()).unwrap();

        let first = masker.mask("write to alice@corp.io").unwrap();
        let second = masker.mask("write to bob@corp.io").unwrap();

        assert!(first.substitutions().contains("alice@corp.io"));
        assert!(!second.substitutions().contains("alice@corp.io"));
        assert_eq!(second.substitutions().len(), 1);
        assert_eq!(second.unmask(second.masked_text()).unwrap(), "write to bob@corp.io");
    }

    #[test]
    fn test_repeated_runs_agree_on_categories() {
        let masker = scripted_masker(profile_recognizer());

        let first = masker.mask(PROFILE_TEXT).unwrap();
        let second = masker.mask(PROFILE_TEXT).unwrap();

        let first_categories: Vec<_> = first.matches().categories().collect();
        let second_categories: Vec<_> = second.matches().categories().collect();
        assert_eq!(first_categories, second_categories);

        for doc in [&first, &second] {
            assert_eq!(doc.unmask(doc.masked_text()).unwrap(), PROFILE_TEXT);
        }
    }

    #[test]
    fn test_recognizer_runs_once_per_mask() {
        let recognizer = Arc::new(profile_recognizer());
        let masker =
            PiiMasker::with_recognizer(MaskerConfig::default(), recognizer.clone()).unwrap();

        masker.mask(PROFILE_TEXT).unwrap();
        masker.mask("no entities here").unwrap();

        assert_eq!(recognizer.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_offloaded_masks() {
        let masker = Arc::new(PiiMasker::from_config(regex_only_config()).unwrap());

        let texts: Vec<String> = (0..8).map(|i| format!("user{i}@corp.io is #{i}")).collect();
        let handles: Vec<_> = texts
            .iter()
            .cloned()
            .map(|text| tokio::spawn(masker.clone().mask_offloaded(text)))
            .collect();

        for (handle, text) in handles.into_iter().zip(&texts) {
            let doc = handle.await.unwrap().unwrap();
            assert_eq!(doc.substitutions().len(), 1);
            assert_eq!(doc.unmask(doc.masked_text()).unwrap(), *text);
        }
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_unavailable_recognizer_fails_whole_request() {
        let masker =
            PiiMasker::with_recognizer(MaskerConfig::default(), Arc::new(UnavailableRecognizer))
                .unwrap();

        let err = masker.mask("Contact john@x.com about Jane Roe").unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[test]
    fn test_unavailable_recognizer_is_skipped_when_entities_disabled() {
        let config = MaskerConfig {
            detect_name: false,
            detect_organization: false,
            ..MaskerConfig::default()
        };
        let masker = PiiMasker::with_recognizer(config, Arc::new(UnavailableRecognizer)).unwrap();

        let doc = masker.mask("Contact john@x.com").unwrap();
        assert_eq!(doc.substitutions().len(), 1);
    }

    #[test]
    fn test_binary_input_is_rejected() {
        let masker = PiiMasker::from_config(regex_only_config()).unwrap();
        let err = masker.mask_bytes(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_broken_gazetteer_fails_construction() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();

        let config = MaskerConfig {
            recognizer: RecognizerConfig {
                enabled: true,
                gazetteer: Some(file.path().to_path_buf()),
            },
            ..MaskerConfig::default()
        };
        assert!(matches!(
            PiiMasker::from_config(config),
            Err(Error::ModelUnavailable(_))
        ));
    }
}
