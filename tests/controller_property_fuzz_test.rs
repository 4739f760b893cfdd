use dependent_questions::{Harness, Options};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const CONTROLLER_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/controller_property_fuzz_test.txt";
const DEFAULT_CONTROLLER_PROPTEST_CASES: u32 = 128;

const PETS: [&str; 3] = ["dog", "cat", "fish"];
const COLORS: [&str; 3] = ["a", "b", "c"];
const STATUSES: [&str; 3] = ["active", "archived", "draft"];
const NICKS: [&str; 5] = ["ok", "OK", "", "no", "ok "];

const SURVEY_HTML: &str = r#"
<form id="survey">
  <div class="sq-form-question" id="q-pet">
    <input type="radio" name="pet" value="dog" id="pet-dog">
    <input type="radio" name="pet" value="cat" id="pet-cat">
    <input type="radio" name="pet" value="fish" id="pet-fish">
  </div>
  <div class="sq-form-question" id="q-color">
    <input type="checkbox" name="color" value="a" id="color-a">
    <input type="checkbox" name="color" value="b" id="color-b">
    <input type="checkbox" name="color" value="c" id="color-c">
  </div>
  <div class="sq-form-question" id="q-status">
    <select name="status" id="status">
      <option value="active">Active</option>
      <option value="archived">Archived</option>
      <option value="draft">Draft</option>
    </select>
    <input name="nick" id="nick">
  </div>
  <div class="sq-form-question" id="q-dog"><span data-depends-on="pet=dog"></span></div>
  <div class="sq-form-question" id="q-cat"><span data-depends-on="pet=cat"></span></div>
  <div class="sq-form-question" id="q-fish"><span data-depends-on="pet=fish"></span></div>
  <div class="sq-form-question" id="q-color-a"><span data-depends-on="color=a"></span></div>
  <div class="sq-form-question" id="q-color-c"><span data-depends-on="color=c"></span></div>
  <div class="sq-form-question" id="q-no-b"><span data-depends-off="color=b"></span></div>
  <div class="sq-form-question" id="q-live"><span data-depends-off="status=archived"></span></div>
  <div class="sq-form-question" id="q-nick"><span data-depends-on="nick=ok"></span></div>
</form>
"#;

#[derive(Clone, Debug)]
enum SurveyAction {
    ClickPet(usize),
    ToggleColor(usize),
    SetColor(usize, bool),
    SelectStatus(usize),
    TypeNick(usize),
    DispatchPet(usize),
}

#[derive(Debug, Default)]
struct SurveyModel {
    pet: Option<usize>,
    colors: [bool; 3],
    status: usize,
    nick: String,
}

impl SurveyModel {
    fn apply(&mut self, action: &SurveyAction) {
        match action {
            SurveyAction::ClickPet(index) => self.pet = Some(*index),
            SurveyAction::ToggleColor(index) => self.colors[*index] = !self.colors[*index],
            SurveyAction::SetColor(index, checked) => self.colors[*index] = *checked,
            SurveyAction::SelectStatus(index) => self.status = *index,
            SurveyAction::TypeNick(index) => self.nick = NICKS[*index].to_string(),
            SurveyAction::DispatchPet(_) => {}
        }
    }

    fn expected_visibility(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("#q-dog", self.pet == Some(0)),
            ("#q-cat", self.pet == Some(1)),
            ("#q-fish", self.pet == Some(2)),
            ("#q-color-a", self.colors[0]),
            ("#q-color-c", self.colors[2]),
            ("#q-no-b", !self.colors[1]),
            ("#q-live", STATUSES[self.status] != "archived"),
            ("#q-nick", self.nick == "ok"),
        ]
    }
}

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn controller_proptest_cases() -> u32 {
    env_proptest_cases(
        "DEPENDENT_QUESTIONS_PROPTEST_CASES",
        DEFAULT_CONTROLLER_PROPTEST_CASES,
    )
}

fn survey_action_strategy() -> BoxedStrategy<SurveyAction> {
    prop_oneof![
        4 => (0..PETS.len()).prop_map(SurveyAction::ClickPet),
        3 => (0..COLORS.len()).prop_map(SurveyAction::ToggleColor),
        2 => ((0..COLORS.len()), any::<bool>())
            .prop_map(|(index, checked)| SurveyAction::SetColor(index, checked)),
        3 => (0..STATUSES.len()).prop_map(SurveyAction::SelectStatus),
        2 => (0..NICKS.len()).prop_map(SurveyAction::TypeNick),
        1 => (0..PETS.len()).prop_map(SurveyAction::DispatchPet),
    ]
    .boxed()
}

fn survey_action_sequence_strategy() -> BoxedStrategy<Vec<SurveyAction>> {
    vec(survey_action_strategy(), 1..=24).boxed()
}

fn run_action(harness: &mut Harness, action: &SurveyAction) -> dependent_questions::Result<()> {
    match action {
        SurveyAction::ClickPet(index) => harness.click(&format!("#pet-{}", PETS[*index])),
        SurveyAction::ToggleColor(index) => harness.click(&format!("#color-{}", COLORS[*index])),
        SurveyAction::SetColor(index, checked) => {
            harness.set_checked(&format!("#color-{}", COLORS[*index]), *checked)
        }
        SurveyAction::SelectStatus(index) => harness.select_option("#status", STATUSES[*index]),
        SurveyAction::TypeNick(index) => harness.type_text("#nick", NICKS[*index]),
        SurveyAction::DispatchPet(index) => {
            harness.dispatch(&format!("#pet-{}", PETS[*index]), "change")
        }
    }
}

fn load_survey(attach_selectors: &[&str]) -> Result<Harness, TestCaseError> {
    let mut harness =
        Harness::from_html(SURVEY_HTML).map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    for selector in attach_selectors {
        harness
            .attach(selector, Options::default())
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    }
    Ok(harness)
}

fn assert_visibility_follows_model(actions: &[SurveyAction]) -> TestCaseResult {
    let mut harness = load_survey(&["#survey"])?;
    let mut model = SurveyModel::default();

    for (step, action) in actions.iter().enumerate() {
        let outcome = run_action(&mut harness, action);
        prop_assert!(
            outcome.is_ok(),
            "action returned error at step {step}: {action:?}, error={outcome:?}"
        );
        model.apply(action);

        for (selector, expected) in model.expected_visibility() {
            let actual = harness
                .is_visible(selector)
                .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
            prop_assert_eq!(
                actual,
                expected,
                "{} after step {}: {:?}, actions={:?}",
                selector,
                step,
                action,
                actions
            );
        }

        let pets_shown = ["#q-dog", "#q-cat", "#q-fish"]
            .iter()
            .filter(|selector| harness.is_visible(selector).unwrap_or(false))
            .count();
        prop_assert_eq!(pets_shown, usize::from(model.pet.is_some()));
    }

    Ok(())
}

fn assert_repeated_attach_matches_single(
    actions: &[SurveyAction],
    extra_attaches: usize,
) -> TestCaseResult {
    let mut once = load_survey(&["#survey"])?;
    let mut selectors = vec!["#survey"];
    selectors.extend(std::iter::repeat_n("form", extra_attaches));
    let mut repeated = load_survey(&selectors)?;

    for control in ["#pet-dog", "#color-b", "#status", "#nick"] {
        let count = repeated
            .change_listener_count(control)
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        prop_assert_eq!(count, 1, "listeners on {}", control);
    }

    for action in actions {
        run_action(&mut once, action).map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
        run_action(&mut repeated, action)
            .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    }

    prop_assert_eq!(once.take_effect_log(), repeated.take_effect_log());
    let once_dom = once
        .dump_dom("#survey")
        .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    let repeated_dom = repeated
        .dump_dom("#survey")
        .map_err(|err| TestCaseError::fail(format!("{err:?}")))?;
    prop_assert_eq!(once_dom, repeated_dom);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: controller_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(CONTROLLER_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn region_visibility_tracks_form_state(actions in survey_action_sequence_strategy()) {
        assert_visibility_follows_model(&actions)?;
    }

    #[test]
    fn attaching_repeatedly_behaves_like_attaching_once(
        actions in survey_action_sequence_strategy(),
        extra_attaches in 1usize..=3,
    ) {
        assert_repeated_attach_matches_single(&actions, extra_attaches)?;
    }
}
