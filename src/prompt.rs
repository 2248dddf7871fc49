//! Agent instruction rendering
//!
//! Rendering is a pure function of the test case and the chosen template:
//! the same case always produces byte-identical text, so the instruction
//! recorded in a case's conversation log is exactly what the agent saw.

use serde::Deserialize;
use std::fmt::Write;

use crate::suite::TestCase;

const RULE: &str = "-----------------------------";

/// Instruction template language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    #[default]
    English,
    Korean,
}

struct Labels {
    intro: &'static str,
    id: &'static str,
    feature: &'static str,
    condition: &'static str,
    input_values: &'static str,
    expected_result: &'static str,
    directive: &'static str,
}

const ENGLISH: Labels = Labels {
    intro: "Please carry out the following test case:",
    id: "Test ID",
    feature: "Feature under test",
    condition: "Detailed conditions",
    input_values: "Input values to use",
    expected_result: "Expected result to verify at the end",
    directive: "Operate the web browser according to the conditions above, \
                check that the final result matches the expected result, \
                and then finish.",
};

const KOREAN: Labels = Labels {
    intro: "다음 테스트 케이스를 수행해주세요:",
    id: "테스트 ID",
    feature: "테스트할 기능",
    condition: "상세 조건",
    input_values: "사용할 입력 값",
    expected_result: "최종적으로 확인해야 할 기대 결과",
    directive: "위 조건에 따라 웹 브라우저를 자동으로 조작하고, \
                최종 결과가 기대 결과와 일치하는지 확인 후 종료해주세요.",
};

impl PromptLanguage {
    fn labels(self) -> &'static Labels {
        match self {
            PromptLanguage::English => &ENGLISH,
            PromptLanguage::Korean => &KOREAN,
        }
    }

    /// Render the instruction for one test case
    pub fn render(self, case: &TestCase) -> String {
        let labels = self.labels();
        let sections = [
            (labels.id, case.id.as_str()),
            (labels.feature, case.feature.as_str()),
            (labels.condition, case.condition.as_str()),
            (labels.input_values, case.input_values.as_str()),
            (labels.expected_result, case.expected_result.as_str()),
        ];

        let mut text = String::new();
        let _ = writeln!(text, "{}\n", labels.intro);
        for (i, (label, value)) in sections.iter().enumerate() {
            let _ = writeln!(text, "## {label}:\n{value}");
            if i + 1 < sections.len() {
                let _ = writeln!(text, "{RULE}\n");
            }
        }
        let _ = write!(text, "\n{}\n", labels.directive);
        text
    }
}

/// Render with the default (English) template
pub fn render(case: &TestCase) -> String {
    PromptLanguage::default().render(case)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_case() -> TestCase {
        TestCase::new(
            "TC-001",
            "Login",
            "Open https://example.test and sign in",
            "user=alice, password=secret",
            "The dashboard greets Alice",
        )
    }

    #[test]
    fn test_render_is_deterministic() {
        let case = login_case();
        assert_eq!(render(&case), render(&case.clone()));
        assert_eq!(
            PromptLanguage::Korean.render(&case),
            PromptLanguage::Korean.render(&case)
        );
    }

    #[test]
    fn test_render_exact_text() {
        let expected = "\
Please carry out the following test case:

## Test ID:
TC-001
-----------------------------

## Feature under test:
Login
-----------------------------

## Detailed conditions:
Open https://example.test and sign in
-----------------------------

## Input values to use:
user=alice, password=secret
-----------------------------

## Expected result to verify at the end:
The dashboard greets Alice

Operate the web browser according to the conditions above, check that the final result matches the expected result, and then finish.
";
        assert_eq!(render(&login_case()), expected);
    }

    #[test]
    fn test_sections_in_order() {
        let text = PromptLanguage::Korean.render(&login_case());
        let positions: Vec<usize> = ["TC-001", "Login", "Open https", "user=alice", "The dashboard", "종료해주세요"]
            .iter()
            .map(|needle| text.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.starts_with("다음 테스트 케이스를 수행해주세요:"));
    }

    #[test]
    fn test_source_row_does_not_change_text() {
        let case = login_case();
        assert_eq!(render(&case), render(&case.clone().at_row(42)));
    }
}
