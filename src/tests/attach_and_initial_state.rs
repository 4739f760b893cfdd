use super::*;

#[test]
fn initial_pass_hides_regions_when_nothing_is_selected() -> Result<()> {
    let h = attached(PET_SURVEY)?;
    h.assert_visible("#q-pet")?;
    h.assert_hidden("#q-dog")?;
    h.assert_hidden("#q-cat")?;
    h.assert_hidden("#q-fish")?;
    assert!(h.effect_log().is_empty());
    Ok(())
}

#[test]
fn initial_pass_reflects_prechecked_radio_without_animation() -> Result<()> {
    let html = PET_SURVEY.replace(
        "value='fish' id='pet-fish'",
        "value='fish' id='pet-fish' checked",
    );
    let mut h = attached(&html)?;
    h.assert_hidden("#q-dog")?;
    h.assert_hidden("#q-cat")?;
    h.assert_visible("#q-fish")?;
    assert!(h.take_effect_log().is_empty());
    Ok(())
}

#[test]
fn attach_reports_questions_keys_and_fields() -> Result<()> {
    let mut h = Harness::from_html(PET_SURVEY)?;
    let outcomes = h.attach("#survey", Options::default())?;
    assert_eq!(outcomes.len(), 1);

    let summary = summary_of(&outcomes[0]);
    assert_eq!(summary.questions, 3);
    assert_eq!(summary.keys, 3);
    assert_eq!(summary.fields, vec!["pet".to_string()]);
    assert!(summary.unbound_fields.is_empty());
    assert!(summary.skipped.is_empty());
    Ok(())
}

#[test]
fn attaching_twice_binds_one_listener_per_control() -> Result<()> {
    let mut h = Harness::from_html(PET_SURVEY)?;
    h.attach("form", Options::default())?;
    let second = h.attach("#survey", Options::default())?;

    assert!(matches!(
        second.as_slice(),
        [AttachOutcome::AlreadyAttached { .. }]
    ));
    assert!(h.is_attached("#survey")?);
    for control in ["#pet-dog", "#pet-cat", "#pet-fish"] {
        assert_eq!(h.change_listener_count(control)?, 1);
    }
    assert_eq!(h.change_listener_count("[name=breed]")?, 0);

    h.click("#pet-dog")?;
    h.assert_visible("#q-dog")?;
    // One binding per key, so three records and not six.
    assert_eq!(h.take_effect_log().len(), 3);
    Ok(())
}

#[test]
fn several_keys_on_one_field_share_a_single_listener() -> Result<()> {
    let html = r#"
        <form>
          <select name='plan' id='plan'>
            <option>Free</option>
            <option>Pro</option>
            <option>Team</option>
          </select>
          <div class='sq-form-question' id='q-pro'><i data-depends-on='plan=Pro'></i></div>
          <div class='sq-form-question' id='q-team'><i data-depends-on='plan=Team'></i></div>
          <div class='sq-form-question' id='q-paid'><i data-depends-off='plan=Free'></i></div>
        </form>
        "#;
    let h = attached(html)?;
    assert_eq!(h.change_listener_count("#plan")?, 1);
    h.assert_hidden("#q-pro")?;
    h.assert_hidden("#q-team")?;
    h.assert_hidden("#q-paid")?;
    Ok(())
}

#[test]
fn malformed_declaration_is_skipped_silently() -> Result<()> {
    let html = r#"
        <form>
          <div class='sq-form-question' id='q-broken'>
            <span data-depends-on='novalue'></span>
          </div>
          <div class='sq-form-question' id='q-orphan'>
            <span data-depends-on='=orphan'></span>
          </div>
        </form>
        "#;
    let mut h = Harness::from_html(html)?;
    let outcomes = h.attach("form", Options::default())?;
    let summary = summary_of(&outcomes[0]);

    assert_eq!(summary.questions, 2);
    assert_eq!(summary.keys, 0);
    let reasons: Vec<SkipReason> = summary.skipped.iter().map(|s| s.reason).collect();
    assert_eq!(
        reasons,
        vec![SkipReason::MissingSeparator, SkipReason::EmptyFieldName]
    );
    assert_eq!(summary.skipped[0].raw, "novalue");

    h.assert_visible("#q-broken")?;
    h.assert_visible("#q-orphan")?;
    assert!(!h.dump_dom("#q-broken")?.contains("style="));
    Ok(())
}

#[test]
fn missing_controller_field_counts_as_no_match() -> Result<()> {
    let html = r#"
        <form>
          <div class='sq-form-question' id='q-on'><b data-depends-on='ghost=1'></b></div>
          <div class='sq-form-question' id='q-off'><b data-depends-off='ghost=1'></b></div>
        </form>
        "#;
    let mut h = Harness::from_html(html)?;
    let outcomes = h.attach("form", Options::default())?;
    let summary = summary_of(&outcomes[0]);

    assert_eq!(summary.unbound_fields, vec!["ghost".to_string()]);
    h.assert_hidden("#q-on")?;
    h.assert_visible("#q-off")?;
    assert_eq!(h.current_value("ghost"), None);
    Ok(())
}

#[test]
fn on_declaration_wins_over_off_inside_the_same_question() -> Result<()> {
    let html = r#"
        <form>
          <input type='checkbox' name='vip' value='yes' id='vip'>
          <div class='sq-form-question' id='q'>
            <em data-depends-off='vip=yes'></em>
            <em data-depends-on='vip=yes'></em>
          </div>
        </form>
        "#;
    let mut h = attached(html)?;
    h.assert_hidden("#q")?;
    h.set_checked("#vip", true)?;
    h.assert_visible("#q")?;
    Ok(())
}

#[test]
fn marker_on_the_question_itself_is_not_a_declaration() -> Result<()> {
    let html = r#"
        <form>
          <input type='radio' name='pet' value='dog'>
          <div class='sq-form-question' id='q' data-depends-on='pet=dog'>Dog details</div>
        </form>
        "#;
    let mut h = Harness::from_html(html)?;
    let outcomes = h.attach("form", Options::default())?;
    assert_eq!(summary_of(&outcomes[0]).questions, 0);
    h.assert_visible("#q")?;
    Ok(())
}

#[test]
fn markers_outside_any_question_are_ignored() -> Result<()> {
    let html = r#"
        <form>
          <input name='mode' value='a'>
          <p id='loose' data-depends-on='mode=b'>loose</p>
        </form>
        "#;
    let mut h = Harness::from_html(html)?;
    let outcomes = h.attach("form", Options::default())?;
    let summary = summary_of(&outcomes[0]);
    assert_eq!(summary.questions, 0);
    assert!(summary.fields.is_empty());
    h.assert_visible("#loose")?;
    Ok(())
}

#[test]
fn hidden_attribute_is_cleared_when_a_region_is_shown() -> Result<()> {
    let html = r#"
        <form>
          <input name='mode' value='b'>
          <div class='sq-form-question' id='q' hidden><b data-depends-on='mode=b'></b></div>
        </form>
        "#;
    let h = attached(html)?;
    h.assert_visible("#q")?;
    assert!(!h.dump_dom("#q")?.contains("hidden"));
    Ok(())
}

#[test]
fn attach_to_unmatched_selector_is_a_no_op() -> Result<()> {
    let mut h = Harness::from_html(PET_SURVEY)?;
    let outcomes = h.attach("#nope", Options::default())?;
    assert!(outcomes.is_empty());
    assert!(!h.is_attached("#survey")?);
    assert_eq!(h.change_listener_count("#pet-dog")?, 0);
    Ok(())
}
