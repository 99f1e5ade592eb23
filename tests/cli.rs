use loan_eda::charts::{GRADE_FILE, HEATMAP_FILE, HISTOGRAM_FILE};
use loan_eda::report::SUMMARY_FILE;
use std::fs;
use std::process::Command;

const LOANS_CSV: &str = "\
id,loan_amnt,int_rate,annual_inc,grade,loan_status,installment,dti,emp_length,purpose
1,5000,10.65%,24000,B,Fully Paid,162.87,27.65,10+ years,credit_card
2,2500,15.27%,30000,C,Charged Off,59.83,1.0,< 1 year,car
3,2400,15.96%,12252,C,Fully Paid,84.33,8.72,10+ years,small_business
4,10000,13.49%,49200,C,Current,339.31,20.0,10+ years,other
5,3000,12.69%,,B,Late (31-120 days),67.79,17.94,1 year,other
6,5000,7.9%,36000,A,Fully Paid,156.46,11.2,3 years,wedding
";

fn loan_eda() -> Command {
    Command::new(env!("CARGO_BIN_EXE_loan-eda"))
}

#[test]
fn successful_run_prints_only_the_completion_message() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("loans.csv");
    fs::write(&input, LOANS_CSV).unwrap();

    let output = loan_eda()
        .arg("--input")
        .arg(&input)
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "EDA complete. Summary and plots saved.\n"
    );
    for name in [SUMMARY_FILE, HISTOGRAM_FILE, GRADE_FILE, HEATMAP_FILE] {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }
}

#[test]
fn missing_input_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();

    let output = loan_eda()
        .arg("--input")
        .arg(dir.path().join("absent.csv"))
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
    assert!(!dir.path().join(SUMMARY_FILE).exists());
}
