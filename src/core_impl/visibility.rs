use super::*;

impl Dom {
    pub(crate) fn style_get(&self, node_id: NodeId, name: &str) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("style target is not an element".into()))?;
        let decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        Ok(decls
            .iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, value)| value.clone())
            .unwrap_or_default())
    }

    pub(crate) fn style_set(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Dom("style target is not an element".into()))?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name.to_string(), value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }

        Ok(())
    }

    /// Own display state, ignoring ancestors.
    pub(crate) fn is_displayed(&self, node_id: NodeId) -> Result<bool> {
        if self.attr(node_id, "hidden").is_some() {
            return Ok(false);
        }
        Ok(!self.style_get(node_id, "display")?.eq_ignore_ascii_case("none"))
    }

    /// Displayed itself and through every ancestor element.
    pub(crate) fn is_rendered(&self, node_id: NodeId) -> Result<bool> {
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if self.element(current).is_some() && !self.is_displayed(current)? {
                return Ok(false);
            }
            cursor = self.parent(current);
        }
        Ok(true)
    }

    pub(crate) fn set_displayed(&mut self, node_id: NodeId, displayed: bool) -> Result<()> {
        if displayed {
            if self.attr(node_id, "hidden").is_some() {
                self.remove_attr(node_id, "hidden")?;
            }
            if self.style_get(node_id, "display")?.eq_ignore_ascii_case("none") {
                self.style_set(node_id, "display", "")?;
            }
            Ok(())
        } else {
            self.style_set(node_id, "display", "none")
        }
    }
}
