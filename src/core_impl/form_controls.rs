use super::*;

fn input_type(element: &Element) -> Option<String> {
    if !element.tag_name.eq_ignore_ascii_case("input") {
        return None;
    }
    Some(
        element
            .attrs
            .get("type")
            .map(|kind| kind.to_ascii_lowercase())
            .unwrap_or_else(|| "text".into()),
    )
}

pub(crate) fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.element(node_id)
        .and_then(input_type)
        .is_some_and(|kind| kind == "checkbox")
}

pub(crate) fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.element(node_id)
        .and_then(input_type)
        .is_some_and(|kind| kind == "radio")
}

fn is_select(dom: &Dom, node_id: NodeId) -> bool {
    dom.tag_name(node_id)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("select"))
}

fn is_option(dom: &Dom, node_id: NodeId) -> bool {
    dom.tag_name(node_id)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("option"))
}

pub(crate) fn control_kind(dom: &Dom, node_id: NodeId) -> ControlKind {
    if is_radio_input(dom, node_id) {
        ControlKind::Radio
    } else if is_checkbox_input(dom, node_id) {
        ControlKind::Checkbox
    } else if is_select(dom, node_id) && dom.attr(node_id, "multiple").is_some() {
        ControlKind::SelectMultiple
    } else {
        ControlKind::Single
    }
}

impl Dom {
    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if is_select(self, node_id) {
            return self.set_select_values(node_id, &[value]);
        }

        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("checked target is not an element".into()))?;
        Ok(element.checked)
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Dom("checked target is not an element".into()))?;
        element.checked = checked;
        Ok(())
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    pub(crate) fn is_checked_or_selected(&self, node_id: NodeId) -> bool {
        if is_option(self, node_id) {
            return self.attr(node_id, "selected").is_some();
        }
        self.element(node_id).is_some_and(|e| e.checked)
    }

    /// Every element carrying `name="<name>"`, in document order.
    pub(crate) fn controls_named(&self, name: &str) -> Vec<NodeId> {
        self.all_element_nodes()
            .into_iter()
            .filter(|node| {
                self.element(*node)
                    .and_then(|element| element.attrs.get("name"))
                    .is_some_and(|value| value == name)
            })
            .collect()
    }

    pub(crate) fn selected_option_values(&self, select_node: NodeId) -> Result<Vec<String>> {
        let mut options = Vec::new();
        self.collect_select_options(select_node, &mut options);
        let mut out = Vec::new();
        for option in options {
            if self.attr(option, "selected").is_some() {
                out.push(self.option_effective_value(option)?);
            }
        }
        Ok(out)
    }

    pub(crate) fn initialize_form_control_values(&mut self) -> Result<()> {
        let nodes = self.all_element_nodes();
        for node in nodes {
            let is_textarea = self
                .tag_name(node)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("textarea"));
            if is_textarea {
                let text = self.text_content(node);
                let element = self
                    .element_mut(node)
                    .ok_or_else(|| Error::Dom("textarea target is not an element".into()))?;
                element.value = text;
                continue;
            }

            if is_radio_input(self, node) || is_checkbox_input(self, node) {
                // A checkable input without a value attribute reports "on".
                let element = self
                    .element_mut(node)
                    .ok_or_else(|| Error::Dom("input target is not an element".into()))?;
                if !element.attrs.contains_key("value") {
                    element.value = "on".into();
                }
                continue;
            }

            if is_select(self, node) {
                self.sync_select_value(node)?;
            }
        }
        Ok(())
    }

    /// Later `checked` radios win over earlier ones in the same group.
    pub(crate) fn normalize_radio_groups(&mut self) -> Result<()> {
        for node in self.all_element_nodes() {
            if is_radio_input(self, node) && self.checked(node)? {
                self.uncheck_other_radios_in_group(node)?;
            }
        }
        Ok(())
    }

    pub(crate) fn uncheck_other_radios_in_group(&mut self, target: NodeId) -> Result<()> {
        let target_name = self.attr(target, "name").unwrap_or_default();
        if target_name.is_empty() {
            return Ok(());
        }
        let target_form = self.find_ancestor_by_tag(target, "form");

        for node in self.all_element_nodes() {
            if node == target || !is_radio_input(self, node) {
                continue;
            }
            if self.attr(node, "name").unwrap_or_default() != target_name {
                continue;
            }
            if self.find_ancestor_by_tag(node, "form") != target_form {
                continue;
            }
            if self.checked(node)? {
                self.set_checked(node, false)?;
            }
        }

        Ok(())
    }

    /// Selects exactly the options whose value is in `requested`; a single
    /// select keeps only the first match.
    pub(crate) fn set_select_values(
        &mut self,
        select_node: NodeId,
        requested: &[&str],
    ) -> Result<()> {
        if !is_select(self, select_node) {
            return Err(Error::Dom("select target is not a select".into()));
        }
        let multiple = self.attr(select_node, "multiple").is_some();

        let mut options = Vec::new();
        self.collect_select_options(select_node, &mut options);

        let mut matched_any = false;
        for option in options {
            let value = self.option_effective_value(option)?;
            let select = requested.contains(&value.as_str()) && (multiple || !matched_any);
            matched_any |= select;
            let option_element = self
                .element_mut(option)
                .ok_or_else(|| Error::Dom("option target is not an element".into()))?;
            if select {
                option_element
                    .attrs
                    .insert("selected".to_string(), "true".to_string());
            } else {
                option_element.attrs.remove("selected");
            }
        }

        self.sync_select_value(select_node)
    }

    fn sync_select_value(&mut self, select_node: NodeId) -> Result<()> {
        let value = self.select_value_from_options(select_node)?;
        let element = self
            .element_mut(select_node)
            .ok_or_else(|| Error::Dom("select target is not an element".into()))?;
        element.value = value;
        Ok(())
    }

    fn select_value_from_options(&self, select_node: NodeId) -> Result<String> {
        let mut options = Vec::new();
        self.collect_select_options(select_node, &mut options);
        if options.is_empty() {
            return Ok(String::new());
        }

        let selected = options
            .iter()
            .copied()
            .find(|option| self.attr(*option, "selected").is_some());
        match selected {
            Some(option) => self.option_effective_value(option),
            // A multiple select with nothing selected has an empty value.
            None if self.attr(select_node, "multiple").is_some() => Ok(String::new()),
            None => self.option_effective_value(options[0]),
        }
    }

    fn collect_select_options(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if is_option(self, *child) {
                out.push(*child);
            }
            self.collect_select_options(*child, out);
        }
    }

    fn option_effective_value(&self, option_node: NodeId) -> Result<String> {
        let element = self
            .element(option_node)
            .ok_or_else(|| Error::Dom("option target is not an element".into()))?;
        if let Some(value) = element.attrs.get("value") {
            return Ok(value.clone());
        }
        Ok(self.text_content(option_node).trim().to_string())
    }
}
