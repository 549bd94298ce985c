//! Built-in FortiOS objects
//!
//! Each submodule declares the schemas of one CMDB area. [`Catalog`] maps
//! resource and data source type names to their handlers.

pub mod firewall;
pub mod router;
pub mod system;

use crate::data_source::{CmdbDataSource, CmdbListDataSource, DataSource};
use crate::resource::{CmdbResource, MkeyKind, Resource, ResourceDefinition};
use fortiflow_client::CmdbPath;
use fortiflow_core::{Block, Field};
use std::collections::BTreeMap;

const ENABLE_DISABLE: &[&str] = &["enable", "disable"];

/// Registry of resources and data sources
#[derive(Default)]
pub struct Catalog {
    resources: BTreeMap<String, Box<dyn Resource>>,
    data_sources: BTreeMap<String, Box<dyn DataSource>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every object shipped with fortiflow
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        for def in [
            firewall::addrgrp(),
            firewall::address(),
            firewall::shaping_policy(),
            router::static_route(),
            system::ssh_config(),
            system::snmp_user(),
            system::external_resource(),
        ] {
            catalog.register_data_source(Box::new(CmdbDataSource::from_resource(&def)));
            catalog.register_resource(Box::new(CmdbResource::new(def)));
        }

        for (def, list_type, list_field) in [
            (firewall::addrgrp(), "fortios_firewall_addrgrplist", "namelist"),
            (firewall::address(), "fortios_firewall_addresslist", "namelist"),
            (router::static_route(), "fortios_router_staticlist", "seq_numlist"),
        ] {
            if let Some(list) = CmdbListDataSource::from_resource(&def, list_type, list_field) {
                catalog.register_data_source(Box::new(list));
            }
        }

        catalog
    }

    pub fn register_resource(&mut self, resource: Box<dyn Resource>) {
        self.resources
            .insert(resource.type_name().to_string(), resource);
    }

    pub fn register_data_source(&mut self, data_source: Box<dyn DataSource>) {
        self.data_sources
            .insert(data_source.type_name().to_string(), data_source);
    }

    pub fn resource(&self, type_name: &str) -> Option<&dyn Resource> {
        self.resources.get(type_name).map(|r| r.as_ref())
    }

    pub fn data_source(&self, type_name: &str) -> Option<&dyn DataSource> {
        self.data_sources.get(type_name).map(|d| d.as_ref())
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}

/// Assemble a definition, adding the provider-side fields every resource has
fn define(
    type_name: &'static str,
    object: &'static str,
    path: &'static str,
    mkey: MkeyKind,
    mut fields: Vec<Field>,
) -> ResourceDefinition {
    let has_tables = fields.iter().any(Field::is_table);

    if has_tables {
        fields.push(
            Field::string("dynamic_sort_subtable")
                .optional()
                .local()
                .one_of(&["false", "true", "natural"])
                .describe("Sort table entries by their first field: false, true or natural"),
        );
        fields.push(
            Field::string("get_all_tables")
                .optional()
                .local()
                .one_of(&["false", "true"])
                .describe("Refresh tables that are not in the configuration"),
        );
    }
    fields.push(
        Field::string("vdomparam")
            .optional()
            .computed()
            .force_new()
            .local()
            .describe("Virtual domain of the object, defaults to the provider vdom"),
    );

    ResourceDefinition {
        type_name,
        object,
        path: CmdbPath::new(path),
        mkey,
        schema: Block::new(fields),
    }
}

/// `enable`/`disable` switch, defaulted by the device
fn switch(name: &'static str) -> Field {
    Field::string(name).optional().computed().one_of(ENABLE_DISABLE)
}

/// String of bounded length, defaulted by the device
fn text(name: &'static str, max: usize) -> Field {
    Field::string(name).optional().computed().len_between(0, max)
}

/// Table of `{ name }` references to other objects
fn name_table(name: &'static str, max: usize) -> Field {
    Field::table(
        name,
        Block::new(vec![Field::string("name").optional().len_between(0, max)]),
    )
    .optional()
}
