use crate::{
    errors::ResolveError,
    key::{Key, Parameter, ParameterList, ProviderKind},
    provider::{interface::As, Produced, Provider},
    types::Instance,
};

/// All providers published under one interface, as `Vec<Arc<dyn I>>`
///
/// Members are resolved individually beforehand, the group only collects them.
pub(crate) struct GroupProvider {
    key: Key,
    parameters: ParameterList,
    members: Vec<As>,
}

impl GroupProvider {
    pub fn new(first: &As) -> Self {
        GroupProvider {
            key: Key::new(first.group(), None, ProviderKind::Group),
            parameters: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Appends a member, `backing` being the Key of its constructor
    pub fn add(&mut self, backing: &Key, alias: As) {
        let mut parameter = Parameter::required(backing.info);
        parameter.name = backing.name.clone();
        self.parameters.push(parameter);
        self.members.push(alias);
    }
}

impl Provider for GroupProvider {
    fn key(&self) -> &Key {
        &self.key
    }

    fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    fn provide(&self, values: &[Option<Instance>]) -> Result<Produced, ResolveError> {
        let mut members = Vec::with_capacity(self.members.len());
        for (index, alias) in self.members.iter().enumerate() {
            let Some(Some(value)) = values.get(index) else {
                return Err(ResolveError::NoProviderForKey(
                    self.parameters[index].to_string(),
                ));
            };
            members.push((alias.cast)(value)?);
        }

        let collect = match self.members.first() {
            Some(alias) => alias.collect,
            None => return Err(ResolveError::NoProviderForKey(self.key.to_string())),
        };
        Ok(collect(&members)?.into())
    }
}
