use super::*;

#[test]
fn slide_fast_is_the_default_transition() -> Result<()> {
    let mut h = attached(PET_SURVEY)?;
    h.click("#pet-dog")?;

    let log = h.take_effect_log();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].target, "div#q-dog");
    assert_eq!(log[0].action, VisibilityAction::SlideDown);
    assert_eq!(log[0].duration_ms, 200);
    assert_eq!(log[1].action, VisibilityAction::SlideUp);
    assert_eq!(log[0].to_string(), "slideDown div#q-dog 200ms");
    Ok(())
}

#[test]
fn fade_with_named_speed() -> Result<()> {
    let mut h = Harness::from_html(PET_SURVEY)?;
    h.attach(
        "form",
        Options::default()
            .with_effect(Effect::Fade)
            .with_duration(Duration::Slow),
    )?;
    h.click("#pet-cat")?;

    let log = h.take_effect_log();
    let cat = log
        .iter()
        .find(|record| record.target == "div#q-cat")
        .expect("cat region animated");
    assert_eq!(cat.action, VisibilityAction::FadeIn);
    assert_eq!(cat.duration_ms, 600);
    assert!(log
        .iter()
        .filter(|record| record.target != "div#q-cat")
        .all(|record| record.action == VisibilityAction::FadeOut));
    Ok(())
}

#[test]
fn json_options_accept_millisecond_durations() -> Result<()> {
    let mut h = Harness::from_html(PET_SURVEY)?;
    h.attach_with_json("form", r#"{"effect":"fade","duration":150}"#)?;
    h.click("#pet-fish")?;
    assert!(h.effect_log().iter().all(|record| record.duration_ms == 150));
    h.assert_visible("#q-fish")?;
    Ok(())
}

#[test]
fn unknown_speed_name_falls_back_to_default_duration() -> Result<()> {
    let mut h = Harness::from_html(PET_SURVEY)?;
    h.attach_with_json("form", r#"{"duration":"medium"}"#)?;
    h.click("#pet-fish")?;
    assert!(h.effect_log().iter().all(|record| record.duration_ms == 400));
    Ok(())
}

#[test]
fn invalid_options_are_rejected_before_anything_is_bound() -> Result<()> {
    let mut h = Harness::from_html(PET_SURVEY)?;
    let err = h
        .attach_with_json("form", r#"{"effect":"bounce"}"#)
        .expect_err("unknown effect");
    assert!(matches!(err, Error::InvalidOptions(_)));

    let err = h
        .attach("form", Options::default().with_question_selector("li ~ li"))
        .expect_err("unsupported combinator");
    assert!(matches!(err, Error::InvalidOptions(_)));

    assert!(!h.is_attached("form")?);
    assert_eq!(h.change_listener_count("#pet-dog")?, 0);
    h.assert_visible("#q-dog")?;
    Ok(())
}

#[test]
fn custom_question_selector_finds_list_items() -> Result<()> {
    let html = r#"
        <form id='order'>
          <select name='delivery' id='delivery'>
            <option value='pickup'>Pickup</option>
            <option value='post'>Post</option>
          </select>
          <ul>
            <li class='question' id='q-address'><i data-depends-on='delivery=post'></i>Address</li>
            <li class='question' id='q-store'><i data-depends-off='delivery=post'></i>Store</li>
            <li class='sq-form-question' id='q-default'><i data-depends-on='delivery=post'></i></li>
          </ul>
        </form>
        "#;
    let mut h = Harness::from_html(html)?;
    let outcomes = h.attach(
        "#order",
        Options::default().with_question_selector("li.question"),
    )?;
    assert_eq!(summary_of(&outcomes[0]).questions, 2);

    h.assert_hidden("#q-address")?;
    h.assert_visible("#q-store")?;
    h.assert_visible("#q-default")?;

    h.select_option("#delivery", "post")?;
    h.assert_visible("#q-address")?;
    h.assert_hidden("#q-store")?;
    h.assert_visible("#q-default")?;
    Ok(())
}

#[test]
fn separate_roots_keep_their_own_options() -> Result<()> {
    let html = r#"
        <div id='page'>
          <form id='a'>
            <input type='checkbox' name='extra-a' value='y' id='extra-a'>
            <div class='sq-form-question' id='qa'><b data-depends-on='extra-a=y'></b></div>
          </form>
          <form id='b'>
            <input type='checkbox' name='extra-b' value='y' id='extra-b'>
            <div class='sq-form-question' id='qb'><b data-depends-on='extra-b=y'></b></div>
          </form>
        </div>
        "#;
    let mut h = Harness::from_html(html)?;
    h.attach("#a", Options::default())?;
    h.attach("#b", Options::default().with_effect(Effect::Fade))?;

    h.click("#extra-a")?;
    h.click("#extra-b")?;
    let actions: Vec<VisibilityAction> =
        h.take_effect_log().into_iter().map(|record| record.action).collect();
    assert_eq!(
        actions,
        vec![VisibilityAction::SlideDown, VisibilityAction::FadeIn]
    );
    Ok(())
}
