//! GraphQL schema of the feed API
//!
//! The executor resolves root fields by name; the SDL below documents them and
//! is served at `/graphql/schema`.

/// Root fields of the `Query` type
pub const QUERY_FIELDS: &[&str] = &["login", "posts", "post"];

/// Root fields of the `Mutation` type
pub const MUTATION_FIELDS: &[&str] = &["createUser", "createPost", "updatePost", "deletePost"];

pub const SCHEMA_SDL: &str = r#"type Post {
    _id: ID!
    title: String!
    content: String!
    imageUrl: String
    creator: User!
    createdAt: String!
    updatedAt: String!
}

type User {
    _id: ID!
    name: String!
    email: String!
    password: String
    posts: [Post!]!
    createdAt: String!
    updatedAt: String!
}

type AuthData {
    token: String!
    userId: String!
}

type PostData {
    posts: [Post!]!
    totalPosts: Int!
}

input UserInputData {
    email: String!
    name: String!
    password: String!
}

input PostInputData {
    title: String!
    content: String!
    imageUrl: String
}

type RootQuery {
    login(email: String!, password: String!): AuthData!
    posts(page: Int): PostData!
    post(id: ID!): Post!
}

type RootMutation {
    createUser(userInput: UserInputData): User!
    createPost(postInput: PostInputData): Post!
    updatePost(id: ID!, postInput: PostInputData): Post!
    deletePost(id: ID!): Boolean
}

schema {
    query: RootQuery
    mutation: RootMutation
}
"#;
