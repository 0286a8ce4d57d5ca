//! Alumni directory.

use deptportal_api_types::IdArg;
use deptportal_api_types::community::{AlumniQuery, Alumnus, CreateAlumnusRequest};
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

use super::{list_tags, segment};

pub const GET_ALUMNI: QueryEndpoint<AlumniQuery, Vec<Alumnus>> =
    QueryEndpoint::new("getAlumni", alumni, TagSpec::Compute(alumni_tags));

pub const ADD_ALUMNUS: MutationEndpoint<CreateAlumnusRequest, Alumnus> =
    MutationEndpoint::new("addAlumnus", add_alumnus, TagSpec::Types(&[TagType::Alumni]));

pub const DELETE_ALUMNUS: MutationEndpoint<IdArg, Value> =
    MutationEndpoint::new("deleteAlumnus", delete_alumnus, TagSpec::Compute(deleted_alumnus));

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_ALUMNI.definition());
    registry.declare(ADD_ALUMNUS.definition());
    registry.declare(DELETE_ALUMNUS.definition());
}

fn alumni(args: &AlumniQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("alumni").query(args)
}

fn alumni_tags(_: &AlumniQuery, alumni: Option<&Vec<Alumnus>>) -> Vec<Tag> {
    list_tags(TagType::Alumni, alumni, |alumnus| alumnus.id.as_str())
}

fn add_alumnus(args: &CreateAlumnusRequest) -> Result<ApiRequest, ApiError> {
    ApiRequest::post("alumni").json(args)
}

fn delete_alumnus(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!("alumni/{}", segment(&args.id)?)))
}

fn deleted_alumnus(args: &IdArg, _: Option<&Value>) -> Vec<Tag> {
    vec![Tag::id(TagType::Alumni, args.id.clone())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alumnus(id: &str) -> Alumnus {
        Alumnus {
            id: id.to_string(),
            name: "Ada".to_string(),
            graduation_year: 2019,
            company: None,
            linkedin_url: None,
        }
    }

    #[test]
    fn filters_become_query_parameters() {
        let request = GET_ALUMNI
            .request(&AlumniQuery {
                graduation_year: Some(2019),
                search: None,
            })
            .expect("request");
        assert_eq!(request.path, "alumni");
        assert_eq!(
            request.query,
            vec![("graduationYear".to_string(), "2019".to_string())]
        );
    }

    #[test]
    fn deleting_reaches_listings_containing_the_alumnus() {
        let provided = GET_ALUMNI.provided_tags(
            &AlumniQuery::default(),
            Some(&vec![alumnus("a1"), alumnus("a2")]),
        );
        let invalidated = DELETE_ALUMNUS.invalidated_tags(&IdArg::new("a2"), &Value::Null);
        assert!(invalidated
            .iter()
            .any(|tag| provided.iter().any(|p| tag.invalidates(p))));

        let unrelated = GET_ALUMNI.provided_tags(&AlumniQuery::default(), Some(&vec![alumnus("a1")]));
        assert!(!invalidated
            .iter()
            .any(|tag| unrelated.iter().any(|p| tag.invalidates(p))));
    }
}
