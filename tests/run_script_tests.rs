use blang::interp::{interpret, BufferedRuntime};

use regex::Regex;
use test_generator::test_resources;

#[derive(Debug, PartialEq)]
struct Outcome {
    output: Vec<String>,
    error: Option<String>,
}

#[test_resources("tests/blang_cases/**/*.blang")]
fn test_script(file: &str) {
    let source = std::fs::read_to_string(file).unwrap();

    let expected = get_expected_outcome(&source);
    let input = get_input(&source);

    let mut runtime = BufferedRuntime::with_input(&input);
    let result = interpret(&source, &mut runtime);

    let actual = Outcome {
        output: runtime.output().lines().map(|l| l.to_owned()).collect(),
        error: result.err().map(|e| e.to_string()),
    };

    assert_eq!(expected, actual);
}

/// Expected output lines and error come from `/* expect: ... */` and
/// `/* expect error: ... */` annotations in the script itself.
fn get_expected_outcome(source: &str) -> Outcome {
    let output_regexer = Regex::new(r"/\* expect: (.*) \*/").unwrap();
    let error_regexer = Regex::new(r"/\* expect error: (.*) \*/").unwrap();

    let mut outcome = Outcome {
        output: vec![],
        error: None,
    };

    for line in source.lines() {
        if let Some(r) = error_regexer.captures(line) {
            outcome.error.replace(r.get(1).unwrap().as_str().to_owned());
        } else if let Some(r) = output_regexer.captures(line) {
            outcome.output.push(r.get(1).unwrap().as_str().to_owned());
        }
    }

    outcome
}

/// Lines fed to `readln`, one per `/* input: ... */` annotation.
fn get_input(source: &str) -> String {
    let input_regexer = Regex::new(r"/\* input: (.*) \*/").unwrap();

    let mut input = String::new();
    for line in source.lines() {
        if let Some(r) = input_regexer.captures(line) {
            input.push_str(r.get(1).unwrap().as_str());
            input.push('\n');
        }
    }
    input
}
